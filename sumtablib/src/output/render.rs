//! Render a `TableGrid` as markdown, LaTeX or plain text.
//!
//! Rendering is pure: it only builds a `String`. Plain-formatted cells can
//! be rendered as any markup and are escaped on the way out; cells already
//! formatted for markdown or LaTeX only render as that markup. Labels,
//! headers and captions are always escaped.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::table::{TableGrid, TableRow};
use crate::error::SummaryError;
use crate::options::Markup;
use crate::Result;

/// Where row-group labels go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowGroupLayout {
    /// A header row above each row-group, member rows indented
    #[default]
    Separator,
    /// A leading column holding the row-group label on its first row
    Column,
}

impl FromStr for RowGroupLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "separator" | "rows" => Ok(RowGroupLayout::Separator),
            "column" | "col" => Ok(RowGroupLayout::Column),
            _ => Err(format!(
                "Invalid layout: '{}'. Valid options: separator, column",
                s
            )),
        }
    }
}

/// Presentation options for [`render`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Table caption
    pub caption: Option<String>,
    /// Replacement column headers, one per column
    pub column_names: Option<Vec<String>>,
    /// Header of the row label column
    pub row_group_header: String,
    pub layout: RowGroupLayout,
    /// Append `(N = n)` to each column header
    pub show_n: bool,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_column_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.column_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_row_group_header(mut self, header: impl Into<String>) -> Self {
        self.row_group_header = header.into();
        self
    }

    pub fn with_layout(mut self, layout: RowGroupLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_show_n(mut self, show_n: bool) -> Self {
        self.show_n = show_n;
        self
    }
}

/// Render `grid` as `markup`.
///
/// Fails with `ShapeMismatch` when replacement column names do not match
/// the grid's column count, and with `InvalidInput` when the grid was
/// formatted for a markup other than `markup` or plain.
pub fn render(grid: &TableGrid, markup: Markup, options: &RenderOptions) -> Result<String> {
    if grid.markup != Markup::Plain && grid.markup != markup {
        return Err(SummaryError::invalid(format!(
            "cannot render a table formatted for {:?} as {:?}",
            grid.markup, markup
        )));
    }
    let headers = column_headers(grid, options)?;
    let sections = row_group_sections(grid);
    let out = match markup {
        Markup::Markdown => render_markdown(&headers, &sections, options),
        Markup::Latex => render_latex(grid, &headers, &sections, options),
        Markup::Plain => render_plain(&headers, &sections, options),
    };
    Ok(out)
}

fn column_headers(grid: &TableGrid, options: &RenderOptions) -> Result<Vec<String>> {
    let names = match &options.column_names {
        Some(names) if names.len() != grid.n_columns() => {
            return Err(SummaryError::shape(
                "render column names",
                grid.n_columns(),
                names.len(),
            ))
        }
        Some(names) => names.clone(),
        None => grid.headers.clone(),
    };
    if !options.show_n {
        return Ok(names);
    }
    Ok(names
        .into_iter()
        .zip(grid.group_sizes.iter().chain(std::iter::repeat(&0)))
        .map(|(name, n)| format!("{} (N = {})", name, n))
        .collect())
}

/// Consecutive rows sharing a row-group label.
fn row_group_sections(grid: &TableGrid) -> Vec<(&str, Vec<&TableRow>)> {
    let mut sections: Vec<(&str, Vec<&TableRow>)> = Vec::new();
    for row in &grid.rows {
        let continues = sections
            .last()
            .is_some_and(|(label, _)| *label == row.row_group.as_str());
        if continues {
            if let Some((_, rows)) = sections.last_mut() {
                rows.push(row);
            }
        } else {
            sections.push((row.row_group.as_str(), vec![row]));
        }
    }
    sections
}

fn escape_markdown(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Escape LaTeX special characters. `±` becomes `$\pm$`.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '±' => out.push_str("$\\pm$"),
            _ => out.push(c),
        }
    }
    out
}

fn render_markdown(
    headers: &[String],
    sections: &[(&str, Vec<&TableRow>)],
    options: &RenderOptions,
) -> String {
    let line = |cells: Vec<String>| format!("| {} |", cells.join(" | "));

    let mut header = vec![escape_markdown(&options.row_group_header)];
    if options.layout == RowGroupLayout::Column {
        header.push(String::new());
    }
    header.extend(headers.iter().map(|h| escape_markdown(h)));

    let mut lines = Vec::new();
    if let Some(caption) = &options.caption {
        lines.push(format!("Table: {}", caption));
        lines.push(String::new());
    }
    lines.push(line(header.clone()));
    lines.push(format!("|{}|", vec![":---"; header.len()].join("|")));

    for (group, rows) in sections {
        match options.layout {
            RowGroupLayout::Separator => {
                let mut cells = vec![format!("**{}**", escape_markdown(group))];
                cells.extend(std::iter::repeat(String::new()).take(headers.len()));
                lines.push(line(cells));
                for row in rows {
                    let mut cells = vec![format!("&nbsp;&nbsp;{}", escape_markdown(&row.label))];
                    cells.extend(row.values.iter().map(|v| escape_markdown(v)));
                    lines.push(line(cells));
                }
            }
            RowGroupLayout::Column => {
                for (i, row) in rows.iter().enumerate() {
                    let lead = if i == 0 {
                        format!("**{}**", escape_markdown(group))
                    } else {
                        String::new()
                    };
                    let mut cells = vec![lead, escape_markdown(&row.label)];
                    cells.extend(row.values.iter().map(|v| escape_markdown(v)));
                    lines.push(line(cells));
                }
            }
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn render_latex(
    grid: &TableGrid,
    headers: &[String],
    sections: &[(&str, Vec<&TableRow>)],
    options: &RenderOptions,
) -> String {
    let cell = |value: &str| {
        if grid.markup == Markup::Latex {
            value.to_string()
        } else {
            escape_latex(value)
        }
    };
    let line = |cells: Vec<String>| format!("{} \\\\", cells.join(" & "));

    let lead_columns = match options.layout {
        RowGroupLayout::Separator => 1,
        RowGroupLayout::Column => 2,
    };
    let total_columns = lead_columns + headers.len();

    let mut lines = Vec::new();
    if let Some(caption) = &options.caption {
        lines.push("\\begin{table}[ht]".to_string());
        lines.push("\\centering".to_string());
        lines.push(format!("\\caption{{{}}}", escape_latex(caption)));
    }
    lines.push(format!("\\begin{{tabular}}{{{}}}", "l".repeat(total_columns)));
    lines.push("\\hline".to_string());

    let mut header = vec![escape_latex(&options.row_group_header)];
    if options.layout == RowGroupLayout::Column {
        header.push(String::new());
    }
    header.extend(headers.iter().map(|h| escape_latex(h)));
    lines.push(line(header));
    lines.push("\\hline".to_string());

    for (group, rows) in sections {
        match options.layout {
            RowGroupLayout::Separator => {
                lines.push(format!(
                    "\\multicolumn{{{}}}{{l}}{{\\textbf{{{}}}}} \\\\",
                    total_columns,
                    escape_latex(group)
                ));
                for row in rows {
                    let mut cells = vec![format!("\\hspace{{1em}}{}", escape_latex(&row.label))];
                    cells.extend(row.values.iter().map(|v| cell(v.as_str())));
                    lines.push(line(cells));
                }
            }
            RowGroupLayout::Column => {
                for (i, row) in rows.iter().enumerate() {
                    let lead = if i == 0 {
                        format!("\\textbf{{{}}}", escape_latex(group))
                    } else {
                        String::new()
                    };
                    let mut cells = vec![lead, escape_latex(&row.label)];
                    cells.extend(row.values.iter().map(|v| cell(v.as_str())));
                    lines.push(line(cells));
                }
            }
        }
    }

    lines.push("\\hline".to_string());
    lines.push("\\end{tabular}".to_string());
    if options.caption.is_some() {
        lines.push("\\end{table}".to_string());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn render_plain(
    headers: &[String],
    sections: &[(&str, Vec<&TableRow>)],
    options: &RenderOptions,
) -> String {
    const INDENT: &str = "  ";
    const GAP: &str = "  ";

    // Build every line as cells first, then pad to the widest cell per column.
    let mut table: Vec<Option<Vec<String>>> = Vec::new();
    let mut header = vec![options.row_group_header.clone()];
    if options.layout == RowGroupLayout::Column {
        header.push(String::new());
    }
    header.extend(headers.iter().cloned());
    table.push(Some(header));
    table.push(None);

    for (group, rows) in sections {
        match options.layout {
            RowGroupLayout::Separator => {
                table.push(Some(vec![group.to_string()]));
                for row in rows {
                    let mut cells = vec![format!("{}{}", INDENT, row.label)];
                    cells.extend(row.values.iter().cloned());
                    table.push(Some(cells));
                }
            }
            RowGroupLayout::Column => {
                for (i, row) in rows.iter().enumerate() {
                    let lead = if i == 0 { group.to_string() } else { String::new() };
                    let mut cells = vec![lead, row.label.clone()];
                    cells.extend(row.values.iter().cloned());
                    table.push(Some(cells));
                }
            }
        }
    }

    let n_columns = table.iter().flatten().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; n_columns];
    for cells in table.iter().flatten() {
        // A lone row-group label spans the row and does not widen column one.
        if cells.len() == 1 && n_columns > 1 {
            continue;
        }
        for (w, c) in widths.iter_mut().zip(cells) {
            *w = (*w).max(c.chars().count());
        }
    }

    let mut lines = Vec::new();
    if let Some(caption) = &options.caption {
        lines.push(caption.clone());
        lines.push(String::new());
    }
    for entry in &table {
        let line = match entry {
            Some(cells) => cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect::<Vec<_>>()
                .join(GAP),
            None => widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join(GAP),
        };
        lines.push(line.trim_end().to_string());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(markup: Markup) -> TableGrid {
        let (yes_a, yes_b) = match markup {
            Markup::Latex => ("2 (100.0\\%)", "0 (0.0\\%)"),
            _ => ("2 (100.0%)", "0 (0.0%)"),
        };
        let pm = match markup {
            Markup::Plain => "±",
            Markup::Markdown => "&plusmn;",
            Markup::Latex => "$\\pm$",
        };
        TableGrid {
            headers: vec!["a".to_string(), "b".to_string()],
            group_sizes: vec![2, 2],
            rows: vec![
                TableRow {
                    row_group: "Response".to_string(),
                    label: "yes".to_string(),
                    values: vec![yes_a.to_string(), yes_b.to_string()],
                },
                TableRow {
                    row_group: "mpg".to_string(),
                    label: "mean (sd)".to_string(),
                    values: vec![format!("21.90 {} 1.27", pm), format!("19.85 {} 1.63", pm)],
                },
            ],
            markup,
        }
    }

    #[test]
    fn test_markdown_separator_layout() {
        let out = render(&grid(Markup::Markdown), Markup::Markdown, &RenderOptions::new()).unwrap();
        let expected = "\
|  | a | b |
|:---|:---|:---|
| **Response** |  |  |
| &nbsp;&nbsp;yes | 2 (100.0%) | 0 (0.0%) |
| **mpg** |  |  |
| &nbsp;&nbsp;mean (sd) | 21.90 &plusmn; 1.27 | 19.85 &plusmn; 1.63 |
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_markdown_caption_show_n_and_column_layout() {
        let options = RenderOptions::new()
            .with_caption("Summary")
            .with_show_n(true)
            .with_row_group_header("Variable")
            .with_layout(RowGroupLayout::Column);
        let out = render(&grid(Markup::Markdown), Markup::Markdown, &options).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Table: Summary");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "| Variable |  | a (N = 2) | b (N = 2) |");
        assert_eq!(lines[3], "|:---|:---|:---|:---|");
        assert_eq!(lines[4], "| **Response** | yes | 2 (100.0%) | 0 (0.0%) |");
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let mut g = grid(Markup::Markdown);
        g.rows[0].label = "yes|no".to_string();
        let out = render(&g, Markup::Markdown, &RenderOptions::new()).unwrap();
        assert!(out.contains("&nbsp;&nbsp;yes\\|no"));
    }

    #[test]
    fn test_latex_separator_layout() {
        let options = RenderOptions::new().with_caption("Cars & more");
        let out = render(&grid(Markup::Latex), Markup::Latex, &options).unwrap();
        let expected = "\
\\begin{table}[ht]
\\centering
\\caption{Cars \\& more}
\\begin{tabular}{lll}
\\hline
 & a & b \\\\
\\hline
\\multicolumn{3}{l}{\\textbf{Response}} \\\\
\\hspace{1em}yes & 2 (100.0\\%) & 0 (0.0\\%) \\\\
\\multicolumn{3}{l}{\\textbf{mpg}} \\\\
\\hspace{1em}mean (sd) & 21.90 $\\pm$ 1.27 & 19.85 $\\pm$ 1.63 \\\\
\\hline
\\end{tabular}
\\end{table}
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_latex_escapes_plain_cells_only() {
        let out = render(&grid(Markup::Plain), Markup::Latex, &RenderOptions::new()).unwrap();
        assert!(out.contains("2 (100.0\\%)"));
        assert!(out.contains("21.90 $\\pm$ 1.27"));
        assert!(!out.contains("\\begin{table}"));

        let latex = render(&grid(Markup::Latex), Markup::Latex, &RenderOptions::new()).unwrap();
        assert!(latex.contains("2 (100.0\\%)"));
        assert!(!latex.contains("\\\\%"));
    }

    #[test]
    fn test_mismatched_markup_rejected() {
        let err = render(&grid(Markup::Markdown), Markup::Latex, &RenderOptions::new()).unwrap_err();
        assert!(matches!(err, SummaryError::InvalidInput(_)));
        let err = render(&grid(Markup::Latex), Markup::Markdown, &RenderOptions::new()).unwrap_err();
        assert!(matches!(err, SummaryError::InvalidInput(_)));
        assert!(render(&grid(Markup::Latex), Markup::Plain, &RenderOptions::new()).is_err());

        let out = render(&grid(Markup::Plain), Markup::Markdown, &RenderOptions::new()).unwrap();
        assert!(out.contains("| 21.90 ± 1.27 |"));
    }

    #[test]
    fn test_latex_column_layout() {
        let options = RenderOptions::new().with_layout(RowGroupLayout::Column);
        let out = render(&grid(Markup::Latex), Markup::Latex, &options).unwrap();
        assert!(out.contains("\\begin{tabular}{llll}"));
        assert!(out.contains("\\textbf{Response} & yes & 2 (100.0\\%) & 0 (0.0\\%) \\\\"));
    }

    #[test]
    fn test_escape_latex() {
        assert_eq!(escape_latex("a_b & 50%"), "a\\_b \\& 50\\%");
        assert_eq!(escape_latex("x^2~y"), "x\\textasciicircum{}2\\textasciitilde{}y");
        assert_eq!(escape_latex("\\"), "\\textbackslash{}");
    }

    #[test]
    fn test_plain_layout() {
        let out = render(&grid(Markup::Plain), Markup::Plain, &RenderOptions::new()).unwrap();
        let expected = concat!(
            "             a             b\n",
            "-----------  ------------  ------------\n",
            "Response\n",
            "  yes        2 (100.0%)    0 (0.0%)\n",
            "mpg\n",
            "  mean (sd)  21.90 ± 1.27  19.85 ± 1.63\n",
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_column_names_must_match() {
        let options = RenderOptions::new().with_column_names(["Only"]);
        let err = render(&grid(Markup::Plain), Markup::Plain, &options).unwrap_err();
        assert!(matches!(err, SummaryError::ShapeMismatch { expected: 2, actual: 1, .. }));

        let options = RenderOptions::new().with_column_names(["Arm A", "Arm B"]);
        let out = render(&grid(Markup::Markdown), Markup::Markdown, &options).unwrap();
        assert!(out.starts_with("|  | Arm A | Arm B |"));
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("column".parse::<RowGroupLayout>(), Ok(RowGroupLayout::Column));
        assert_eq!("Separator".parse::<RowGroupLayout>(), Ok(RowGroupLayout::Separator));
        assert!("side".parse::<RowGroupLayout>().is_err());
    }
}
