//! The cafe menu.  Items double as daily streak choices and as per-item
//! serve commands (`!latte @friend`).

pub struct MenuItem {
    pub key: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
    /// Serve line; `{user}` is replaced with the recipient
    pub serve: &'static str,
}

const fn item(
    key: &'static str,
    label: &'static str,
    emoji: &'static str,
    serve: &'static str,
) -> MenuItem {
    MenuItem {
        key,
        label,
        emoji,
        serve,
    }
}

pub const MENU: &[MenuItem] = &[
    item("latte", "Latte", "☕", "A warm, creamy latte for {user}!"),
    item("cocoa", "Hot Cocoa", "🍫", "Hot cocoa with marshmallows for {user}!"),
    item("pancake", "Pancakes", "🥞", "A stack of syrupy pancakes for {user}!"),
    item("tea", "Tea", "🫖", "A soothing pot of tea for {user}!"),
    item("green_tea", "Green Tea", "🍵", "Fresh green tea for {user}!"),
    item("matcha", "Matcha Latte", "🍵", "A whisked matcha latte for {user}!"),
    item("chai", "Chai", "🫖", "Spiced chai for {user}!"),
    item("iced_tea", "Iced Tea", "🧋", "Chilled iced tea for {user}!"),
    item("lemonade", "Lemonade", "🍋", "Zesty lemonade for {user}!"),
    item("smoothie", "Smoothie", "🍓", "A fruity smoothie for {user}!"),
    item("milkshake", "Milkshake", "🥤", "A thick milkshake for {user}!"),
    item("espresso", "Espresso", "☕", "A bold espresso for {user}!"),
    item("cappuccino", "Cappuccino", "☕", "Foamy cappuccino for {user}!"),
    item("macchiato", "Macchiato", "☕", "A caramel-kissed macchiato for {user}!"),
    item("americano", "Americano", "☕", "A smooth americano for {user}!"),
    item("mocha", "Mocha", "🍫", "Chocolatey mocha for {user}!"),
    item("flat_white", "Flat White", "☕", "Silky flat white for {user}!"),
    item("donut", "Donut", "🍩", "A fresh donut for {user}!"),
    item("muffin", "Muffin", "🧁", "A blueberry muffin for {user}!"),
    item("cupcake", "Cupcake", "🧁", "A glittery cupcake for {user}!"),
    item("croissant", "Croissant", "🥐", "A buttery croissant for {user}!"),
    item("waffle", "Waffle", "🧇", "A crispy waffle for {user}!"),
    item("brownie", "Brownie", "🍫", "A fudgy brownie for {user}!"),
    item("cookie", "Cookie", "🍪", "A fresh-baked cookie for {user}!"),
];

pub fn find(key: &str) -> Option<&'static MenuItem> {
    MENU.iter().find(|it| it.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        for (i, a) in MENU.iter().enumerate() {
            for b in &MENU[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn find_by_key() {
        assert_eq!(find("latte").unwrap().label, "Latte");
        assert!(find("tofu").is_none());
    }
}
