use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_non_negative, validate_positive, validate_range, Validate,
};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_REPORT_TITLE: &str = "Radiation Oncology \u{2014} Monthly Performance Report";

/// Geometry and typography of the report template. All lengths are in
/// millimetres measured from the top-left corner of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LayoutConfig {
    pub page: PageConfig,
    pub typography: TypographyConfig,
    pub spacing: SpacingConfig,
    pub table: TableConfig,
    pub document: DocumentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_left_mm: f32,
    pub margin_right_mm: f32,
    pub margin_top_mm: f32,
    /// Distance of the page-break line from the bottom edge.
    pub break_margin_mm: f32,
    /// Distance of the footer row from the bottom edge.
    pub footer_offset_mm: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_left_mm: 10.0,
            margin_right_mm: 10.0,
            margin_top_mm: 10.0,
            break_margin_mm: 20.0,
            footer_offset_mm: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypographyConfig {
    pub title_pt: f32,
    pub body_pt: f32,
    pub section_pt: f32,
    pub summary_pt: f32,
    pub table_header_pt: f32,
    pub table_body_pt: f32,
    pub footer_pt: f32,
}

impl Default for TypographyConfig {
    fn default() -> Self {
        Self {
            title_pt: 15.0,
            body_pt: 12.0,
            section_pt: 12.0,
            summary_pt: 11.0,
            table_header_pt: 10.0,
            table_body_pt: 10.0,
            footer_pt: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingConfig {
    pub header_row_mm: f32,
    pub header_gap_mm: f32,
    pub title_row_mm: f32,
    pub title_gap_mm: f32,
    pub section_bar_mm: f32,
    pub section_gap_mm: f32,
    pub summary_row_mm: f32,
    pub summary_gap_mm: f32,
    pub footer_row_mm: f32,
    pub cell_padding_mm: f32,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            header_row_mm: 10.0,
            header_gap_mm: 10.0,
            title_row_mm: 8.0,
            title_gap_mm: 5.0,
            section_bar_mm: 8.0,
            section_gap_mm: 2.0,
            summary_row_mm: 7.0,
            summary_gap_mm: 10.0,
            footer_row_mm: 10.0,
            cell_padding_mm: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub summary_label_mm: f32,
    pub name_column_mm: f32,
    pub value_column_mm: f32,
    pub header_row_mm: f32,
    pub body_row_mm: f32,
    pub line_width_mm: f32,
    /// Gray level of the section bars, 0.0 black to 1.0 white.
    pub shade_gray: f32,
    pub repeat_header_on_break: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            summary_label_mm: 60.0,
            name_column_mm: 130.0,
            value_column_mm: 60.0,
            header_row_mm: 8.0,
            body_row_mm: 7.0,
            line_width_mm: 0.2,
            shade_gray: 0.9,
            repeat_header_on_break: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub title: String,
    pub producer: String,
    pub compress: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_REPORT_TITLE.to_string(),
            producer: "clinic-report".to_string(),
            compress: true,
        }
    }
}

impl LayoutConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReportError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReportError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn content_width_mm(&self) -> f32 {
        self.page.width_mm - self.page.margin_left_mm - self.page.margin_right_mm
    }

    /// Y coordinate past which no row may extend.
    pub fn break_line_mm(&self) -> f32 {
        self.page.height_mm - self.page.break_margin_mm
    }

    /// Y coordinate where content starts once the running header is drawn.
    pub fn content_top_mm(&self) -> f32 {
        self.page.margin_top_mm + self.spacing.header_row_mm + self.spacing.header_gap_mm
    }

    /// Tallest block the layout ever keeps together on one page.
    fn tallest_block_mm(&self) -> f32 {
        [
            self.spacing.title_row_mm,
            self.spacing.summary_row_mm,
            self.spacing.section_bar_mm
                + self.spacing.section_gap_mm
                + self.table.header_row_mm
                + self.table.body_row_mm,
        ]
        .into_iter()
        .fold(0.0, f32::max)
    }
}

impl Validate for LayoutConfig {
    fn validate(&self) -> Result<()> {
        let page = &self.page;
        validate_positive("page.width_mm", page.width_mm)?;
        validate_positive("page.height_mm", page.height_mm)?;
        for (field, value) in [
            ("page.margin_left_mm", page.margin_left_mm),
            ("page.margin_right_mm", page.margin_right_mm),
            ("page.margin_top_mm", page.margin_top_mm),
            ("page.break_margin_mm", page.break_margin_mm),
            ("page.footer_offset_mm", page.footer_offset_mm),
            ("spacing.header_gap_mm", self.spacing.header_gap_mm),
            ("spacing.title_gap_mm", self.spacing.title_gap_mm),
            ("spacing.section_gap_mm", self.spacing.section_gap_mm),
            ("spacing.summary_gap_mm", self.spacing.summary_gap_mm),
            ("spacing.cell_padding_mm", self.spacing.cell_padding_mm),
            ("table.line_width_mm", self.table.line_width_mm),
        ] {
            validate_non_negative(field, value)?;
        }

        for (field, value) in [
            ("spacing.header_row_mm", self.spacing.header_row_mm),
            ("spacing.title_row_mm", self.spacing.title_row_mm),
            ("spacing.section_bar_mm", self.spacing.section_bar_mm),
            ("spacing.summary_row_mm", self.spacing.summary_row_mm),
            ("spacing.footer_row_mm", self.spacing.footer_row_mm),
            ("table.summary_label_mm", self.table.summary_label_mm),
            ("table.name_column_mm", self.table.name_column_mm),
            ("table.value_column_mm", self.table.value_column_mm),
            ("table.header_row_mm", self.table.header_row_mm),
            ("table.body_row_mm", self.table.body_row_mm),
        ] {
            validate_positive(field, value)?;
        }

        let typography = &self.typography;
        for (field, value) in [
            ("typography.title_pt", typography.title_pt),
            ("typography.body_pt", typography.body_pt),
            ("typography.section_pt", typography.section_pt),
            ("typography.summary_pt", typography.summary_pt),
            ("typography.table_header_pt", typography.table_header_pt),
            ("typography.table_body_pt", typography.table_body_pt),
            ("typography.footer_pt", typography.footer_pt),
        ] {
            validate_range(field, value, 4.0, 72.0)?;
        }
        validate_range("table.shade_gray", self.table.shade_gray, 0.0, 1.0)?;
        validate_non_empty_string("document.title", &self.document.title)?;

        let content_width = self.content_width_mm();
        validate_positive("page content width", content_width)?;

        let table_width = self.table.name_column_mm + self.table.value_column_mm;
        if table_width > content_width + 1e-3 {
            return Err(ReportError::InvalidConfigValueError {
                field: "table.name_column_mm + table.value_column_mm".to_string(),
                value: table_width.to_string(),
                reason: format!("Columns exceed the content width of {} mm", content_width),
            });
        }

        if self.table.summary_label_mm >= content_width {
            return Err(ReportError::InvalidConfigValueError {
                field: "table.summary_label_mm".to_string(),
                value: self.table.summary_label_mm.to_string(),
                reason: format!("Label column leaves no room in {} mm", content_width),
            });
        }

        if page.footer_offset_mm > page.height_mm {
            return Err(ReportError::InvalidConfigValueError {
                field: "page.footer_offset_mm".to_string(),
                value: page.footer_offset_mm.to_string(),
                reason: "Footer would sit above the top of the page".to_string(),
            });
        }

        let room = self.break_line_mm() - self.content_top_mm();
        if self.tallest_block_mm() > room {
            return Err(ReportError::InvalidConfigValueError {
                field: "page".to_string(),
                value: room.to_string(),
                reason: format!(
                    "Content area of {} mm cannot hold a {} mm block",
                    room,
                    self.tallest_block_mm()
                ),
            });
        }

        Ok(())
    }
}
