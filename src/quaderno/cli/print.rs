use colored::Colorize;
use quaderno::commands::{CmdMessage, MessageLevel};
use quaderno::config::QuadernoConfig;
use quaderno::model::{CompanyProfile, FieldApplication, MovementRecord, StockLine};
use rust_decimal::Decimal;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const NAME_WIDTH: usize = 28;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_stock(lines: &[StockLine]) {
    if lines.is_empty() {
        return;
    }
    let rows: Vec<Vec<String>> = lines
        .iter()
        .map(|line| {
            vec![
                truncate_to_width(&line.product_name, NAME_WIDTH),
                line.lot.clone(),
                line.unit.clone(),
                quantity(line.quantity_on_hand),
                money(line.unit_cost),
                line.value().map(money).unwrap_or_else(|_| "-".to_string()),
            ]
        })
        .collect();
    print_table(
        &["Prodotto", "Lotto", "Unità", "Giacenza", "Costo", "Valore"],
        &[false, false, false, true, true, true],
        &rows,
    );
}

pub(super) fn print_movements(movements: &[MovementRecord]) {
    if movements.is_empty() {
        return;
    }
    let rows: Vec<Vec<String>> = movements
        .iter()
        .map(|m| {
            let signed = if m.signed_quantity > Decimal::ZERO {
                format!("+{}", quantity(m.signed_quantity))
            } else {
                quantity(m.signed_quantity)
            };
            vec![
                m.date.to_string(),
                truncate_to_width(&m.product_name, NAME_WIDTH),
                m.lot.clone(),
                m.unit.clone(),
                signed,
                m.operator.clone(),
                m.note.clone(),
            ]
        })
        .collect();
    print_table(
        &["Data", "Prodotto", "Lotto", "Unità", "Quantità", "Operatore", "Note"],
        &[false, false, false, false, true, false, false],
        &rows,
    );
}

pub(super) fn print_applications<R: FieldApplication>(records: &[R], dose_header: &str) {
    if records.is_empty() {
        return;
    }
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.date().to_string(),
                r.field().to_string(),
                truncate_to_width(r.product_name(), NAME_WIDTH),
                quantity(r.dose_per_hectare()),
                quantity(r.hectares()),
                r.quantity_used().map(quantity).unwrap_or_else(|_| "-".to_string()),
                r.operator().to_string(),
            ]
        })
        .collect();
    print_table(
        &["Data", "Campo", "Prodotto", dose_header, "Ettari", "Totale", "Operatore"],
        &[false, false, false, true, true, true, false],
        &rows,
    );
}

pub(super) fn print_company(profile: &CompanyProfile) {
    let fields = [
        ("Ragione sociale", &profile.ragione_sociale),
        ("P. IVA", &profile.piva),
        ("Indirizzo", &profile.indirizzo),
        ("Telefono", &profile.telefono),
        ("Email", &profile.email),
    ];
    for (label, value) in fields {
        println!("{:<16} {}", format!("{}:", label).bold(), value);
    }
}

pub(super) fn print_config(config: &QuadernoConfig) {
    for key in QuadernoConfig::KEYS {
        let value = config.get(key).unwrap_or_default();
        println!("{:<18} {}", key.bold(), value);
    }
}

fn quantity(value: Decimal) -> String {
    value.normalize().to_string()
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

/// Render a column-aligned table. Widths are measured in terminal columns so
/// accented names line up.
fn print_table(headers: &[&str], right_align: &[bool], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let header_line = format_row(
        &headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
        &widths,
        right_align,
    );
    println!("{}", header_line.bold());
    for row in rows {
        println!("{}", format_row(row, &widths, right_align));
    }
}

fn format_row(cells: &[String], widths: &[usize], right_align: &[bool]) -> String {
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| pad(cell, widths[i], right_align[i]))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn pad(cell: &str, width: usize, right: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(cell.width()));
    if right {
        format!("{}{}", fill, cell)
    } else {
        format!("{}{}", cell, fill)
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_truncate_keeps_short_names() {
        assert_eq!(truncate_to_width("Urea", 10), "Urea");
    }

    #[test]
    fn test_truncate_long_names() {
        let out = truncate_to_width("Poltiglia bordolese disperss", 10);
        assert_eq!(out.width(), 10);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn test_pad_measures_display_width() {
        assert_eq!(pad("Unità", 7, false), "Unità  ");
        assert_eq!(pad("3", 4, true), "   3");
    }

    #[test]
    fn test_number_formats() {
        assert_eq!(quantity(dec!(70.000)), "70");
        assert_eq!(money(dec!(0.8)), "0.80");
    }
}
