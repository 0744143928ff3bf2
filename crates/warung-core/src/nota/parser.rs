//! Regex table parser for OCR'd receipt text.
//!
//! The deterministic fallback behind AI normalization: it recognizes the
//! six-column markdown-like table layout receipts are rendered in and
//! nothing else. Malformed rows are skipped, never errors.

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::patterns::{ITEM_ROW, RP_AMOUNT, TOTAL_LINE};
use crate::models::nota::{ParsedItem, ParsedNota};

/// Parse an amount with Indonesian thousand separators stripped: `1.500`
/// and `1,500` both yield `1500`. Decimal prices are not supported by this
/// format.
fn parse_amount(s: &str) -> Option<Decimal> {
    let digits: String = s.chars().filter(|c| *c != '.' && *c != ',').collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn parse_qty(s: &str) -> Option<u32> {
    let digits: String = s.chars().filter(|c| *c != '.' && *c != ',').collect();
    digits.parse().ok()
}

/// Whether an otherwise well-formed row is a header or separator artifact.
fn is_filler_name(name: &str) -> bool {
    name.is_empty() || name == "---" || name.to_lowercase().contains("nama")
}

/// Parse raw OCR text into a receipt using the six-column table rules.
///
/// Lines that match the item-row pattern become items; remaining lines
/// mentioning "jumlah" or "total" are scanned for an `Rp`-prefixed amount,
/// keeping the largest candidate (a grand total outranks any subtotal or
/// pre-discount line). With no total line at all, the total falls back to
/// the sum of the item prices.
pub fn parse_nota(text: &str) -> ParsedNota {
    let mut items: Vec<ParsedItem> = Vec::new();
    let mut total = Decimal::ZERO;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(caps) = ITEM_ROW.captures(line) {
            let name = caps[2].trim().to_string();
            if is_filler_name(&name) {
                continue;
            }

            let (Some(qty), Some(price)) = (parse_qty(&caps[3]), parse_amount(&caps[5])) else {
                continue;
            };

            debug!(%name, qty, %price, "matched item row");
            items.push(ParsedItem { name, qty, price });
        } else if TOTAL_LINE.is_match(line) {
            if let Some(value) = RP_AMOUNT.captures(line).and_then(|c| parse_amount(&c[1])) {
                total = total.max(value);
            }
        }
    }

    if total.is_zero() && !items.is_empty() {
        total = items.iter().map(|item| item.price).sum();
    }

    info!(items = items.len(), %total, "parsed receipt text");

    ParsedNota {
        items,
        total,
        raw_text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(name: &str, qty: u32, price: i64) -> ParsedItem {
        ParsedItem {
            name: name.to_string(),
            qty,
            price: Decimal::from(price),
        }
    }

    #[test]
    fn parses_six_column_rows_and_total_line() {
        let text = "\
| 1 | Kopi Item | 2 pcs | 5.000/pcs | Rp10.000 |
| 2 | Roti | 1 pcs | 8.000/pcs | Rp8.000 |
Jumlah Total: Rp18.000";

        let nota = parse_nota(text);
        assert_eq!(
            nota.items,
            vec![item("Kopi Item", 2, 10_000), item("Roti", 1, 8_000)]
        );
        assert_eq!(nota.total, Decimal::from(18_000));
        assert_eq!(nota.raw_text, text);
    }

    #[test]
    fn thousand_separators_are_stripped() {
        let nota = parse_nota("| 1 | Gula | 1 kg | 12.500/kg | Rp12.500 |");
        assert_eq!(nota.items[0].price, Decimal::from(12_500));

        let nota = parse_nota("| 1 | Gula | 1 kg | 12,500/kg | Rp12,500 |");
        assert_eq!(nota.items[0].price, Decimal::from(12_500));
    }

    #[test]
    fn total_falls_back_to_item_sum() {
        let text = "\
| 1 | Teh | 1 pcs | 5.000/pcs | Rp5.000 |
| 2 | Gula | 1 pcs | 3.000/pcs | Rp3.000 |";

        let nota = parse_nota(text);
        assert_eq!(nota.total, Decimal::from(8_000));
    }

    #[test]
    fn keeps_largest_total_candidate() {
        let text = "\
| 1 | Beras | 1 sak | 150.000/sak | Rp150.000 |
Subtotal: Rp150.000
Diskon total: Rp5.000
Jumlah: Rp145.000";

        // Both candidate lines parse; the max-reduction keeps the larger.
        let nota = parse_nota(text);
        assert_eq!(nota.total, Decimal::from(150_000));
    }

    #[test]
    fn header_and_separator_rows_are_skipped() {
        let text = "\
| 1 | Nama Barang | 9 pcs | 1.000/pcs | Rp9.000 |
| 2 | --- | 9 pcs | 1.000/pcs | Rp9.000 |
| 3 | Sabun | 2 pcs | 2.000/pcs | Rp4.000 |";

        let nota = parse_nota(text);
        assert_eq!(nota.items, vec![item("Sabun", 2, 4_000)]);
    }

    #[test]
    fn unparseable_numeric_fields_skip_the_row() {
        let nota = parse_nota("| 1 | Kopi | ., pcs | 5.000/pcs | Rp., |");
        assert!(nota.items.is_empty());
        assert_eq!(nota.total, Decimal::ZERO);
    }

    #[test]
    fn blank_lines_and_prose_are_ignored() {
        let text = "\
Warung Bu Sari

| 1 | Kopi | 1 pcs | 5.000/pcs | Rp5.000 |

Terima kasih";

        let nota = parse_nota(text);
        assert_eq!(nota.items.len(), 1);
        assert_eq!(nota.total, Decimal::from(5_000));
    }

    #[test]
    fn total_line_without_rp_prefix_is_ignored() {
        let text = "\
| 1 | Kopi | 1 pcs | 5.000/pcs | Rp5.000 |
Total 99.000";

        let nota = parse_nota(text);
        assert_eq!(nota.total, Decimal::from(5_000));
    }

    #[test]
    fn zero_priced_items_leave_total_zero() {
        let nota = parse_nota("| 1 | Gratis | 1 pcs | 0/pcs | Rp0 |");
        assert_eq!(nota.items.len(), 1);
        assert_eq!(nota.total, Decimal::ZERO);
    }
}
