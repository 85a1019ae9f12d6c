use std::io::IsTerminal;

use polars::prelude::*;

pub fn print_md(s: impl AsRef<str>) {
    let mut printer = MarkdownPrinter::new();
    printer.add(s);
    printer.dump();
}

pub struct MarkdownPrinter {
    content: String,
}

impl Default for MarkdownPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownPrinter {
    pub fn new() -> Self {
        Self {
            content: String::new(),
        }
    }

    fn is_tty(&self) -> bool {
        std::io::stdout().is_terminal()
    }

    pub fn dump(&self) {
        if self.is_tty() {
            let mut skin = termimad::MadSkin::default();
            for i in 0..8 {
                skin.headers[i].align = termimad::Alignment::Left;
                skin.headers[i].add_attr(termimad::crossterm::style::Attribute::Bold);
                skin.headers[i].set_fg(termimad::crossterm::style::Color::Blue);
            }
            skin.headers[0].set_bg(termimad::crossterm::style::Color::Blue);
            skin.headers[0].add_attr(termimad::crossterm::style::Attribute::NoUnderline);
            skin.print_text(&self.content);
        } else {
            println!("{}", self.content);
        }
    }

    pub fn add(&mut self, s: impl AsRef<str>) {
        self.content.push_str(s.as_ref());
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn add_table(&mut self, headers: &[String], rows: &[Vec<String>]) {
        self.add(format!("| {} |\n", headers.join(" | ")));
        self.add(format!(
            "|{}\n",
            headers.iter().map(|_| ":-:|").collect::<String>()
        ));
        for row in rows {
            self.add(format!("| {} |\n", row.join(" | ")));
        }
    }

    /// Floats are printed with 6 decimals, like the benchmark executables report seconds.
    pub fn add_dataframe(&mut self, df: &DataFrame) {
        let headers = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let row = df
                .get_columns()
                .iter()
                .map(|c| match c.get(i) {
                    Ok(AnyValue::Float64(v)) => format!("{:.6}", v),
                    Ok(AnyValue::Float32(v)) => format!("{:.6}", v),
                    Ok(AnyValue::String(s)) => s.to_owned(),
                    Ok(AnyValue::Null) => "-".to_owned(),
                    Ok(v) => format!("{}", v),
                    Err(_) => "?".to_owned(),
                })
                .collect::<Vec<_>>();
            rows.push(row);
        }
        self.add_table(&headers, &rows);
    }
}

#[macro_export]
macro_rules! print_md {
    ($($arg:tt)*) => {
        $crate::utils::md::print_md(format!($($arg)*));
    };
}
