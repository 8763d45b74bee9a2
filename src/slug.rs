//! URL-safe anchor identifiers derived from heading text.
//!
//! ```text
//! "Ünïcode & Friends (2024)"  →  "unicode-and-friends-2024"
//! "3. Résumé"                 →  "resume"
//! "???"                       →  "anchor"
//! ```
//!
//! Steps, in order:
//!
//! 1. Transliterate known non-ASCII letters, currency signs and a few symbols
//!    to ASCII (`é` → `e`, `ж` → `zh`, `€` → `euro`, `&` → `and`).
//! 2. Turn every whitespace run into a single `-`.
//! 3. Drop everything outside `[A-Za-z0-9_-]`.
//! 4. Drop the leading run of characters that are not ASCII letters, so the
//!    slug is a valid `id` that starts with a letter.
//! 5. Collapse `-` runs and lowercase.
//!
//! An empty result becomes [`DEFAULT_SLUG`]. Uniqueness is not handled here;
//! see [`crate::registry`].

pub const DEFAULT_SLUG: &str = "anchor";

/// Derive a slug from heading text.
pub fn slugify(text: &str) -> String {
    let mut ascii = String::with_capacity(text.len());
    for c in text.chars() {
        match transliterate(c) {
            Some(replacement) => ascii.push_str(replacement),
            None => ascii.push(c),
        }
    }

    let mut slug = String::with_capacity(ascii.len());
    let mut in_whitespace = false;
    for c in ascii.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            slug.push(c);
        }
    }

    let start = slug
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(slug.len());

    let mut collapsed = String::with_capacity(slug.len() - start);
    for c in slug[start..].chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c.to_ascii_lowercase());
    }

    if collapsed.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        collapsed
    }
}

fn transliterate(c: char) -> Option<&'static str> {
    let ascii = match c {
        // latin
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "A",
        'Æ' => "AE",
        'Ç' => "C",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'Ð' => "D",
        'Ñ' => "N",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ő' | 'Ø' => "O",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ű' => "U",
        'Ý' => "Y",
        'Þ' => "TH",
        'ß' => "ss",
        'ẞ' => "SS",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'æ' => "ae",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ð' => "d",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ő' | 'ø' => "o",
        'ù' | 'ú' | 'û' | 'ü' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'þ' => "th",
        // greek
        'α' | 'ά' => "a",
        'β' => "b",
        'γ' => "g",
        'δ' => "d",
        'ε' | 'έ' => "e",
        'ζ' => "z",
        'η' | 'ή' => "h",
        'θ' => "8",
        'ι' | 'ί' | 'ϊ' | 'ΐ' => "i",
        'κ' => "k",
        'λ' => "l",
        'μ' => "m",
        'ν' => "n",
        'ξ' => "3",
        'ο' | 'ό' => "o",
        'π' => "p",
        'ρ' => "r",
        'σ' | 'ς' => "s",
        'τ' => "t",
        'υ' | 'ύ' | 'ϋ' | 'ΰ' => "y",
        'φ' => "f",
        'χ' => "x",
        'ψ' => "ps",
        'ω' | 'ώ' => "w",
        'Α' | 'Ά' => "A",
        'Β' => "B",
        'Γ' => "G",
        'Δ' => "D",
        'Ε' | 'Έ' => "E",
        'Ζ' => "Z",
        'Η' | 'Ή' => "H",
        'Θ' => "8",
        'Ι' | 'Ί' | 'Ϊ' => "I",
        'Κ' => "K",
        'Λ' => "L",
        'Μ' => "M",
        'Ν' => "N",
        'Ξ' => "3",
        'Ο' | 'Ό' => "O",
        'Π' => "P",
        'Ρ' => "R",
        'Σ' => "S",
        'Τ' => "T",
        'Υ' | 'Ύ' | 'Ϋ' => "Y",
        'Φ' => "F",
        'Χ' => "X",
        'Ψ' => "PS",
        'Ω' | 'Ώ' => "W",
        // turkish
        'ş' => "s",
        'Ş' => "S",
        'ı' => "i",
        'İ' => "I",
        'ğ' => "g",
        'Ğ' => "G",
        // russian
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'ш' | 'щ' => "sh",
        'ъ' => "u",
        'ы' => "y",
        'ь' | 'Ь' => "",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        'А' => "A",
        'Б' => "B",
        'В' => "V",
        'Г' => "G",
        'Д' => "D",
        'Е' => "E",
        'Ё' => "Yo",
        'Ж' => "Zh",
        'З' => "Z",
        'И' => "I",
        'Й' => "J",
        'К' => "K",
        'Л' => "L",
        'М' => "M",
        'Н' => "N",
        'О' => "O",
        'П' => "P",
        'Р' => "R",
        'С' => "S",
        'Т' => "T",
        'У' => "U",
        'Ф' => "F",
        'Х' => "H",
        'Ц' => "C",
        'Ч' => "Ch",
        'Ш' | 'Щ' => "Sh",
        'Ъ' => "U",
        'Ы' => "Y",
        'Э' => "E",
        'Ю' => "Yu",
        'Я' => "Ya",
        // ukrainian
        'Є' => "Ye",
        'І' => "I",
        'Ї' => "Yi",
        'Ґ' => "G",
        'є' => "ye",
        'і' => "i",
        'ї' => "yi",
        'ґ' => "g",
        // czech
        'č' => "c",
        'ď' => "d",
        'ě' => "e",
        'ň' => "n",
        'ř' => "r",
        'š' => "s",
        'ť' => "t",
        'ů' => "u",
        'ž' => "z",
        'Č' => "C",
        'Ď' => "D",
        'Ě' => "E",
        'Ň' => "N",
        'Ř' => "R",
        'Š' => "S",
        'Ť' => "T",
        'Ů' => "U",
        'Ž' => "Z",
        // polish
        'ą' => "a",
        'ć' => "c",
        'ę' => "e",
        'ł' => "l",
        'ń' => "n",
        'ś' => "s",
        'ź' | 'ż' => "z",
        'Ą' => "A",
        'Ć' => "C",
        'Ę' => "E",
        'Ł' => "L",
        'Ń' => "N",
        'Ś' => "S",
        'Ź' | 'Ż' => "Z",
        // latvian
        'ā' => "a",
        'ē' => "e",
        'ģ' => "g",
        'ī' => "i",
        'ķ' => "k",
        'ļ' => "l",
        'ņ' => "n",
        'ū' => "u",
        'Ā' => "A",
        'Ē' => "E",
        'Ģ' => "G",
        'Ī' => "I",
        'Ķ' => "K",
        'Ļ' => "L",
        'Ņ' => "N",
        'Ū' => "U",
        // currency
        '€' => "euro",
        '₢' => "cruzeiro",
        '₣' => "french franc",
        '£' => "pound",
        '₤' => "lira",
        '₥' => "mill",
        '₦' => "naira",
        '₧' => "peseta",
        '₨' => "rupee",
        '₩' => "won",
        '₪' => "new shequel",
        '₫' => "dong",
        '₭' => "kip",
        '₮' => "tugrik",
        '₯' => "drachma",
        '₰' => "penny",
        '₱' => "peso",
        '₲' => "guarani",
        '₳' => "austral",
        '₴' => "hryvnia",
        '₵' => "cedi",
        '¢' => "cent",
        '¥' | '円' => "yen",
        '元' => "yuan",
        '﷼' => "rial",
        '₠' => "ecu",
        '¤' => "currency",
        '฿' => "baht",
        '$' => "dollar",
        // symbols
        'œ' => "oe",
        'Œ' => "OE",
        '∑' => "sum",
        '∂' => "d",
        'ƒ' => "f",
        '™' => "tm",
        '℠' => "sm",
        '˚' | 'º' => "o",
        'ª' => "a",
        '∆' => "delta",
        '∞' => "infinity",
        '♥' => "love",
        '&' => "and",
        '|' => "or",
        '<' => "less",
        '>' => "greater",
        _ => return None,
    };
    Some(ascii)
}
