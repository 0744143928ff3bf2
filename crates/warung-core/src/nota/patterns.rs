//! Regex patterns for receipt table parsing.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Six-column receipt table row:
    ///
    /// `| 1 | Kopi Item | 2 pcs | 5.000/pcs | Rp10.000 |`
    ///
    /// Captures: row index, item name, quantity, unit price, line total.
    /// The unit-price column must carry the `/unit` marker; the total must
    /// be `Rp`-prefixed.
    pub static ref ITEM_ROW: Regex = Regex::new(
        r"^\|\s*(\d+)\s*\|\s*([^|]*?)\s*\|\s*([\d.,]+)\s*[^|/]*\|\s*([\d.,]+)\s*/[^|]*\|\s*Rp\s*\.?\s*([\d.,]+)"
    ).unwrap();

    /// Candidate total line marker (Indonesian "jumlah" or "total").
    pub static ref TOTAL_LINE: Regex = Regex::new(r"(?i)jumlah|total").unwrap();

    /// `Rp`-prefixed amount, tolerating the `Rp.` spelling.
    pub static ref RP_AMOUNT: Regex = Regex::new(r"(?i)Rp\s*\.?\s*([\d.,]+)").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_row_captures_all_columns() {
        let caps = ITEM_ROW
            .captures("| 1 | Kopi Item | 2 pcs | 5.000/pcs | Rp10.000 |")
            .unwrap();
        assert_eq!(&caps[1], "1");
        assert_eq!(&caps[2], "Kopi Item");
        assert_eq!(&caps[3], "2");
        assert_eq!(&caps[4], "5.000");
        assert_eq!(&caps[5], "10.000");
    }

    #[test]
    fn item_row_requires_unit_marker() {
        assert!(ITEM_ROW.captures("| 1 | Kopi | 2 pcs | 5.000 | Rp10.000 |").is_none());
    }

    #[test]
    fn item_row_requires_rp_prefix() {
        assert!(ITEM_ROW.captures("| 1 | Kopi | 2 pcs | 5.000/pcs | 10.000 |").is_none());
    }

    #[test]
    fn separator_row_does_not_match() {
        assert!(ITEM_ROW.captures("|---|---|---|---|---|").is_none());
    }

    #[test]
    fn rp_amount_tolerates_dot_spelling() {
        let caps = RP_AMOUNT.captures("Jumlah: Rp. 18.000").unwrap();
        assert_eq!(&caps[1], "18.000");
    }
}
