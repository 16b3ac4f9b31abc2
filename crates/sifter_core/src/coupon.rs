/// Recognized coupon prefixes. Both the Czech and Slovak spellings encode
/// the same campaign.
pub const COUPON_PREFIXES: [&str; 2] = ["ALZADNY", "ALZADNI"];

/// Decode the discount percentage from a coupon code.
///
/// The first recognized prefix wins; the rest of the code must start with a
/// decimal digit run, which is parsed as the percentage. Anything else
/// (unknown prefix, non-numeric suffix, overflow) decodes to 0.
pub fn extract_discount(code: &str) -> u32 {
    for prefix in COUPON_PREFIXES {
        if let Some(rest) = code.strip_prefix(prefix) {
            return parse_leading_digits(rest);
        }
    }
    0
}

/// The highest discount among a product's coupon codes; 0 when there are
/// none.
pub fn best_discount<'a, I>(codes: I) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    codes
        .into_iter()
        .map(extract_discount)
        .max()
        .unwrap_or(0)
}

fn parse_leading_digits(text: &str) -> u32 {
    let digits: &str = {
        let end = text
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(text.len(), |(i, _)| i);
        &text[..end]
    };
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_suffix_parses() {
        assert_eq!(extract_discount("ALZADNY60"), 60);
        assert_eq!(extract_discount("ALZADNI40"), 40);
    }

    #[test]
    fn trailing_garbage_after_digits_is_ignored() {
        // Matches the lenient integer parsing of the site's own codes.
        assert_eq!(extract_discount("ALZADNY30EXTRA"), 30);
    }

    #[test]
    fn non_numeric_suffix_is_zero() {
        assert_eq!(extract_discount("ALZADNYXX"), 0);
        assert_eq!(extract_discount("ALZADNY"), 0);
    }

    #[test]
    fn unknown_prefix_is_zero() {
        assert_eq!(extract_discount("SOMETHING50"), 0);
        assert_eq!(extract_discount(""), 0);
    }

    #[test]
    fn first_matching_prefix_wins() {
        // A code that only parses under the second prefix still decodes.
        assert_eq!(extract_discount("ALZADNI15"), 15);
    }

    #[test]
    fn best_discount_takes_the_maximum() {
        assert_eq!(best_discount(["ALZADNY10", "ALZADNI55", "JUNK"]), 55);
        assert_eq!(best_discount(Vec::<&str>::new()), 0);
    }
}
