//! Naming utilities for code generation

/// Convert an underscore-separated identifier into a humped identifier.
///
/// Every segment after the first gets its first ASCII lowercase letter
/// upper-cased; with `capitalize_first` the first segment does too.
/// Empty segments (from consecutive underscores) are kept as empty strings,
/// so `"a__b"` becomes `"aB"`.
pub fn to_identifier(source: &str, capitalize_first: bool) -> String {
    let mut out = String::with_capacity(source.len());
    for (i, segment) in source.split('_').enumerate() {
        if i == 0 && !capitalize_first {
            out.push_str(segment);
        } else {
            push_capitalized(&mut out, segment);
        }
    }
    out
}

fn push_capitalized(out: &mut String, segment: &str) {
    let mut chars = segment.chars();
    if let Some(first) = chars.next() {
        out.push(first.to_ascii_uppercase());
        out.push_str(chars.as_str());
    }
}

/// Strip the first prefix (in list order) that `table_name` starts with.
///
/// First match wins, not the longest one. A table named exactly like its
/// prefix keeps its full name, the base name is never empty.
pub fn strip_table_prefix<'a, S: AsRef<str>>(table_name: &'a str, prefixes: &[S]) -> &'a str {
    prefixes
        .iter()
        .find_map(|prefix| {
            let prefix: &str = prefix.as_ref();
            table_name.strip_prefix(prefix)
        })
        .filter(|stripped| !stripped.is_empty())
        .unwrap_or(table_name)
}

/// Convert a table name to the humped base name of its artifacts
/// e.g., "bt_order_item" with prefix "bt_" -> "OrderItem"
pub fn to_humped_table_name<S: AsRef<str>>(table_name: &str, prefixes: &[S]) -> String {
    to_identifier(strip_table_prefix(table_name, prefixes), true)
}

/// Convert a column name to a property name (camelCase)
pub fn to_property_name(column_name: &str) -> String {
    to_identifier(column_name, false)
}

/// Convert a column name to an accessor suffix (PascalCase)
/// e.g., "order_no" -> "OrderNo" for `getOrderNo`
pub fn to_accessor_suffix(column_name: &str) -> String {
    to_identifier(column_name, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_identifier() {
        assert_eq!(to_identifier("order_item", false), "orderItem");
        assert_eq!(to_identifier("order_item", true), "OrderItem");
        assert_eq!(to_identifier("", true), "");
        assert_eq!(to_identifier("", false), "");
        assert_eq!(to_identifier("id", true), "Id");
        assert_eq!(to_identifier("id", false), "id");
    }

    #[test]
    fn test_to_identifier_keeps_first_segment_untouched() {
        assert_eq!(to_identifier("Order_item", false), "OrderItem");
        assert_eq!(to_identifier("orderItem_no", false), "orderItemNo");
    }

    #[test]
    fn test_to_identifier_consecutive_underscores() {
        assert_eq!(to_identifier("a__b", false), "aB");
        assert_eq!(to_identifier("a__b", true), "AB");
        assert_eq!(to_identifier("_id", false), "Id");
        assert_eq!(to_identifier("id_", true), "Id");
    }

    #[test]
    fn test_to_identifier_non_ascii_and_digits() {
        assert_eq!(to_identifier("名字_abc", true), "名字Abc");
        assert_eq!(to_identifier("col_1st", false), "col1st");
        assert_eq!(to_identifier("über_alles", true), "überAlles");
    }

    #[test]
    fn test_to_identifier_length_and_determinism() {
        for source in ["order_item", "a_b_c_d", "user", "x_y", "created_at_utc"] {
            for flag in [true, false] {
                let out = to_identifier(source, flag);
                assert!(!out.contains('_'));
                assert_eq!(
                    out.len(),
                    source.len() - source.matches('_').count(),
                    "length mismatch for {source}"
                );
                assert_eq!(out, to_identifier(source, flag));
            }
        }
    }

    #[test]
    fn test_strip_table_prefix() {
        let prefixes = ["bt_", "sys_"];
        assert_eq!(strip_table_prefix("bt_order", &prefixes), "order");
        assert_eq!(strip_table_prefix("sys_log", &prefixes), "log");
        assert_eq!(strip_table_prefix("usr_account", &prefixes), "usr_account");
        let none: [&str; 0] = [];
        assert_eq!(strip_table_prefix("bt_order", &none), "bt_order");
    }

    #[test]
    fn test_strip_table_prefix_first_match_wins() {
        let prefixes = ["bt_", "bt_order_"];
        assert_eq!(strip_table_prefix("bt_order_item", &prefixes), "order_item");
        let prefixes = ["bt_order_", "bt_"];
        assert_eq!(strip_table_prefix("bt_order_item", &prefixes), "item");
    }

    #[test]
    fn test_strip_table_prefix_never_empties_name() {
        assert_eq!(strip_table_prefix("bt_", &["bt_"]), "bt_");
        assert_eq!(strip_table_prefix("bt_", &["bt_", "b"]), "bt_");
        assert_eq!(to_humped_table_name("bt_", &["bt_"]), "Bt");
    }

    #[test]
    fn test_to_humped_table_name() {
        assert_eq!(to_humped_table_name("bt_order", &["bt_"]), "Order");
        assert_eq!(
            to_humped_table_name("usr_account", &["bt_"]),
            "UsrAccount"
        );
        assert_eq!(to_property_name("order_no"), "orderNo");
        assert_eq!(to_accessor_suffix("order_no"), "OrderNo");
    }
}
