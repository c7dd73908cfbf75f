//! 产品列表渲染

use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

use super::form::format_number;
use super::model::Product;

const HEADERS: [&str; 5] = ["#", "Nombre", "Características", "Precio", "Año"];

/// 把本地镜像渲染成文本表格；没有 id 的行不显示编辑/删除操作
pub fn render_table(products: &[Product]) -> String {
    if products.is_empty() {
        return "(no hay productos)\n".to_string();
    }

    let rows: Vec<[String; 5]> = products
        .iter()
        .enumerate()
        .map(|(i, p)| {
            [
                (i + 1).to_string(),
                p.name.clone(),
                p.data.features.clone(),
                format_price(p.data.price),
                p.data.year.to_string(),
            ]
        })
        .collect();

    // 按终端显示宽度对齐，中日韩文字和 emoji 占两列
    let mut widths = HEADERS.map(UnicodeWidthStr::width);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.width());
        }
    }

    let mut out = String::new();
    write_row(&mut out, &HEADERS.map(String::from), &widths, "");
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));

    for (row, product) in rows.iter().zip(products) {
        let actions = if product.is_persisted() {
            "  [editar] [eliminar]"
        } else {
            ""
        };
        write_row(&mut out, row, &widths, actions);
    }
    out
}

fn write_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5], suffix: &str) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{}{}", cell, " ".repeat(w - cell.width())))
        .collect();
    let line = format!("{}{}", padded.join(" | "), suffix);
    let _ = writeln!(out, "{}", line.trim_end());
}

pub fn format_price(price: f64) -> String {
    format!("${}", format_number(price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::product::model::ProductPayload;

    #[test]
    fn test_empty_table() {
        assert_eq!(render_table(&[]), "(no hay productos)\n");
    }

    #[test]
    fn test_actions_gated_on_id() {
        let mut saved = Product::from(ProductPayload::new("Teclado", "Mecánico", 1000.0, 2025));
        saved.id = Some("1".to_string());
        let draft = Product::from(ProductPayload::new("Mouse", "Óptico", 19.5, 2024));

        let table = render_table(&[saved, draft]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("# | Nombre"));
        assert!(lines[2].contains("Teclado") && lines[2].contains("$1000"));
        assert!(lines[2].ends_with("[editar] [eliminar]"));
        assert!(lines[3].contains("$19.5") && lines[3].ends_with("2024"));
        assert!(!lines[3].contains("[editar]"));
    }

    #[test]
    fn test_wide_names_stay_aligned() {
        let mut wide = Product::from(ProductPayload::new("键盘", "机械", 1000.0, 2025));
        wide.id = Some("1".to_string());
        let mut narrow = Product::from(ProductPayload::new("Mouse", "Óptico", 19.5, 2024));
        narrow.id = Some("2".to_string());

        let table = render_table(&[wide, narrow]);
        let lines: Vec<&str> = table.lines().collect();

        // 每一行的列分隔符都落在同一显示列上
        let separator_columns = |line: &str| -> Vec<usize> {
            line.match_indices(" | ")
                .map(|(i, _)| line[..i].width())
                .collect()
        };
        assert_eq!(separator_columns(lines[2]), separator_columns(lines[0]));
        assert_eq!(separator_columns(lines[3]), separator_columns(lines[0]));
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1200.0), "$1200");
        assert_eq!(format_price(0.99), "$0.99");
    }
}
