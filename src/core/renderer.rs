use super::encoding::WinAnsiText;
use super::fonts::FontFace;
use super::format::{format_count, format_decimal};
use super::layout::{Align, CellStyle, LayoutCursor, LayoutEngine, PageCanvas, PageGeometry};
use super::pdf::{self, DocumentInfo};
use crate::config::layout::LayoutConfig;
use crate::domain::model::ClinicPeriodMetrics;
use crate::domain::ports::PageDecorator;
use crate::utils::error::{RenderError, Result as ReportResult};
use crate::utils::validation::Validate;
use tracing::info;

pub const EXECUTIVE_SUMMARY_TITLE: &str = "Executive Summary";
pub const PROVIDER_BREAKDOWN_TITLE: &str = "Provider Breakdown";
pub const PROVIDER_NAME_HEADER: &str = "Provider Name";
pub const PROVIDER_RVU_HEADER: &str = "Total wRVUs";
pub const EMPTY_BREAKDOWN_TEXT: &str = "No individual provider data found for this period.";

/// Renders one [`ClinicPeriodMetrics`] with the default layout.
pub fn render(metrics: &ClinicPeriodMetrics) -> Result<Vec<u8>, RenderError> {
    ReportRenderer::default().render(metrics)
}

/// Every string the report prints, encoded before layout starts so a bad
/// character fails the call before any page exists.
struct ReportText {
    title: WinAnsiText,
    scope_line: WinAnsiText,
    period_line: WinAnsiText,
    summary: Vec<(WinAnsiText, WinAnsiText)>,
    executive_summary: WinAnsiText,
    provider_breakdown: WinAnsiText,
    name_header: WinAnsiText,
    rvu_header: WinAnsiText,
    empty_breakdown: WinAnsiText,
    providers: Vec<(WinAnsiText, WinAnsiText)>,
}

impl ReportText {
    fn encode(metrics: &ClinicPeriodMetrics, config: &LayoutConfig) -> Result<Self, RenderError> {
        let providers = metrics
            .provider_breakdown()
            .iter()
            .enumerate()
            .map(|(index, provider)| -> Result<_, RenderError> {
                let name = WinAnsiText::encode(
                    &format!("provider_breakdown[{index}].name"),
                    provider.name(),
                )?;
                let total = WinAnsiText::encode(
                    &format!("provider_breakdown[{index}].total_rvu"),
                    &format_decimal(provider.total_rvu(), 2),
                )?;
                Ok((name, total))
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        let summary = [
            ("Total wRVUs:", format_decimal(metrics.total_weighted_rvu(), 2)),
            ("wRVU per FTE:", format_decimal(metrics.rvu_per_fte(), 2)),
            (
                "New Patients (Approx):",
                format_count(metrics.new_patient_count_approx()),
            ),
        ]
        .into_iter()
        .map(|(label, value)| -> Result<_, RenderError> {
            Ok((
                WinAnsiText::encode("summary label", label)?,
                WinAnsiText::encode(label, &value)?,
            ))
        })
        .collect::<Result<Vec<_>, RenderError>>()?;

        Ok(Self {
            title: WinAnsiText::encode("document.title", &config.document.title)?,
            scope_line: WinAnsiText::labeled("Scope: ", "clinic_name", metrics.clinic_name())?,
            period_line: WinAnsiText::labeled("Period: ", "period_label", metrics.period_label())?,
            summary,
            executive_summary: WinAnsiText::encode("section title", EXECUTIVE_SUMMARY_TITLE)?,
            provider_breakdown: WinAnsiText::encode("section title", PROVIDER_BREAKDOWN_TITLE)?,
            name_header: WinAnsiText::encode("table header", PROVIDER_NAME_HEADER)?,
            rvu_header: WinAnsiText::encode("table header", PROVIDER_RVU_HEADER)?,
            empty_breakdown: WinAnsiText::encode("fallback row", EMPTY_BREAKDOWN_TEXT)?,
            providers,
        })
    }
}

/// Running header and footer drawn on every physical page.
struct ReportChrome<'a> {
    config: &'a LayoutConfig,
    title: &'a WinAnsiText,
}

impl PageDecorator for ReportChrome<'_> {
    fn on_page_start(
        &self,
        canvas: &mut PageCanvas,
        cursor: &mut LayoutCursor,
    ) -> Result<(), RenderError> {
        let config = self.config;
        let style = CellStyle::text(
            FontFace::Bold,
            config.typography.title_pt,
            config.spacing.cell_padding_mm,
        )
        .aligned(Align::Center);
        canvas.cell(
            config.page.margin_left_mm,
            config.page.margin_top_mm,
            config.content_width_mm(),
            config.spacing.header_row_mm,
            self.title,
            &style,
        );
        cursor.y = config.content_top_mm();
        Ok(())
    }

    fn on_page_end(&self, canvas: &mut PageCanvas, cursor: &LayoutCursor) -> Result<(), RenderError> {
        let config = self.config;
        let label = WinAnsiText::encode("footer", &format!("Page {}", cursor.page))?;
        let style = CellStyle::text(
            FontFace::Italic,
            config.typography.footer_pt,
            config.spacing.cell_padding_mm,
        )
        .aligned(Align::Center);
        canvas.cell(
            config.page.margin_left_mm,
            config.page.height_mm - config.page.footer_offset_mm,
            config.content_width_mm(),
            config.spacing.footer_row_mm,
            &label,
            &style,
        );
        Ok(())
    }
}

/// Lays a [`ClinicPeriodMetrics`] out on the fixed report template.
///
/// Holds only configuration; each `render` call builds its own pages and
/// cursor, so one renderer can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    config: LayoutConfig,
}

impl ReportRenderer {
    /// Uses `config` as given; see [`ReportRenderer::try_new`] for a
    /// constructor that validates it first.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn try_new(config: LayoutConfig) -> ReportResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn render(&self, metrics: &ClinicPeriodMetrics) -> Result<Vec<u8>, RenderError> {
        let text = ReportText::encode(metrics, &self.config)?;
        let chrome = ReportChrome {
            config: &self.config,
            title: &text.title,
        };

        let mut engine = LayoutEngine::start(self.geometry(), &chrome)?;
        self.title_section(&mut engine, &text)?;
        self.executive_summary(&mut engine, &text)?;
        self.provider_breakdown(&mut engine, &text)?;
        let pages = engine.finish()?;
        let page_count = pages.len();

        let document_title = format!(
            "{} - {} - {}",
            self.config.document.title,
            metrics.clinic_name(),
            metrics.period_label()
        );
        let bytes = pdf::assemble(
            pages,
            &DocumentInfo {
                title: &document_title,
                producer: &self.config.document.producer,
                compress: self.config.document.compress,
            },
        )?;

        info!(
            clinic = metrics.clinic_name(),
            period = metrics.period_label(),
            providers = metrics.provider_count(),
            pages = page_count,
            bytes = bytes.len(),
            "rendered performance report"
        );
        Ok(bytes)
    }

    fn geometry(&self) -> PageGeometry {
        let config = &self.config;
        PageGeometry {
            width_mm: config.page.width_mm,
            height_mm: config.page.height_mm,
            margin_left_mm: config.page.margin_left_mm,
            content_width_mm: config.content_width_mm(),
            break_line_mm: config.break_line_mm(),
            line_width_mm: config.table.line_width_mm,
        }
    }

    fn style(&self, font: FontFace, size_pt: f32) -> CellStyle {
        CellStyle::text(font, size_pt, self.config.spacing.cell_padding_mm)
    }

    fn title_section<D: PageDecorator + ?Sized>(
        &self,
        engine: &mut LayoutEngine<'_, D>,
        text: &ReportText,
    ) -> Result<(), RenderError> {
        let geometry = *engine.geometry();
        let style = self.style(FontFace::Regular, self.config.typography.body_pt);
        for line in [&text.scope_line, &text.period_line] {
            engine.row(self.config.spacing.title_row_mm, |canvas, y| {
                canvas.cell(
                    geometry.margin_left_mm,
                    y,
                    geometry.content_width_mm,
                    self.config.spacing.title_row_mm,
                    line,
                    &style,
                );
            })?;
        }
        engine.advance(self.config.spacing.title_gap_mm);
        Ok(())
    }

    fn section_bar<D: PageDecorator + ?Sized>(
        &self,
        engine: &mut LayoutEngine<'_, D>,
        title: &WinAnsiText,
    ) -> Result<(), RenderError> {
        let geometry = *engine.geometry();
        let height = self.config.spacing.section_bar_mm;
        let style = self
            .style(FontFace::Bold, self.config.typography.section_pt)
            .filled(self.config.table.shade_gray);
        engine.row(height, |canvas, y| {
            canvas.cell(
                geometry.margin_left_mm,
                y,
                geometry.content_width_mm,
                height,
                title,
                &style,
            );
        })?;
        engine.advance(self.config.spacing.section_gap_mm);
        Ok(())
    }

    fn executive_summary<D: PageDecorator + ?Sized>(
        &self,
        engine: &mut LayoutEngine<'_, D>,
        text: &ReportText,
    ) -> Result<(), RenderError> {
        self.section_bar(engine, &text.executive_summary)?;

        let geometry = *engine.geometry();
        let height = self.config.spacing.summary_row_mm;
        let label_width = self.config.table.summary_label_mm;
        let size = self.config.typography.summary_pt;
        let label_style = self.style(FontFace::Regular, size);
        let value_style = self.style(FontFace::Bold, size);

        for (label, value) in &text.summary {
            engine.row(height, |canvas, y| {
                canvas.cell(geometry.margin_left_mm, y, label_width, height, label, &label_style);
                canvas.cell(
                    geometry.margin_left_mm + label_width,
                    y,
                    geometry.content_width_mm - label_width,
                    height,
                    value,
                    &value_style,
                );
            })?;
        }
        engine.advance(self.config.spacing.summary_gap_mm);
        Ok(())
    }

    fn table_header<D: PageDecorator + ?Sized>(
        &self,
        engine: &mut LayoutEngine<'_, D>,
        text: &ReportText,
    ) -> Result<(), RenderError> {
        let geometry = *engine.geometry();
        let table = &self.config.table;
        let style = self
            .style(FontFace::Bold, self.config.typography.table_header_pt)
            .aligned(Align::Center)
            .bordered();
        engine.row(table.header_row_mm, |canvas, y| {
            canvas.cell(
                geometry.margin_left_mm,
                y,
                table.name_column_mm,
                table.header_row_mm,
                &text.name_header,
                &style,
            );
            canvas.cell(
                geometry.margin_left_mm + table.name_column_mm,
                y,
                table.value_column_mm,
                table.header_row_mm,
                &text.rvu_header,
                &style,
            );
        })
    }

    fn provider_breakdown<D: PageDecorator + ?Sized>(
        &self,
        engine: &mut LayoutEngine<'_, D>,
        text: &ReportText,
    ) -> Result<(), RenderError> {
        let table = &self.config.table;
        let spacing = &self.config.spacing;

        // Keep the section bar together with the first rows of its table.
        let mut lead_in = spacing.section_bar_mm + spacing.section_gap_mm + table.body_row_mm;
        if !text.providers.is_empty() {
            lead_in += table.header_row_mm;
        }
        engine.ensure_room(lead_in)?;
        self.section_bar(engine, &text.provider_breakdown)?;

        let geometry = *engine.geometry();
        let size = self.config.typography.table_body_pt;

        if text.providers.is_empty() {
            let style = self.style(FontFace::Regular, size).bordered();
            return engine.row(table.body_row_mm, |canvas, y| {
                canvas.cell(
                    geometry.margin_left_mm,
                    y,
                    geometry.content_width_mm,
                    table.body_row_mm,
                    &text.empty_breakdown,
                    &style,
                );
            });
        }

        // Keep the column header together with the first body row.
        engine.ensure_room(table.header_row_mm + table.body_row_mm)?;
        self.table_header(engine, text)?;

        let name_style = self.style(FontFace::Regular, size).bordered();
        let value_style = name_style.aligned(Align::Right);
        for (name, total) in &text.providers {
            if !engine.fits(table.body_row_mm) {
                engine.break_page()?;
                if table.repeat_header_on_break {
                    self.table_header(engine, text)?;
                }
            }
            engine.row(table.body_row_mm, |canvas, y| {
                canvas.cell(
                    geometry.margin_left_mm,
                    y,
                    table.name_column_mm,
                    table.body_row_mm,
                    name,
                    &name_style,
                );
                canvas.cell(
                    geometry.margin_left_mm + table.name_column_mm,
                    y,
                    table.value_column_mm,
                    table.body_row_mm,
                    total,
                    &value_style,
                );
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ProviderMetric;

    fn metrics(providers: Vec<ProviderMetric>) -> ClinicPeriodMetrics {
        ClinicPeriodMetrics::new("Example Clinic", "March 2026", 12345.6, 0.0, 987, providers)
    }

    #[test]
    fn report_text_formats_summary_values() {
        let text = ReportText::encode(&metrics(Vec::new()), &LayoutConfig::default()).unwrap();
        let values: Vec<&[u8]> = text.summary.iter().map(|(_, v)| v.as_bytes()).collect();
        assert_eq!(values, vec![&b"12,345.60"[..], b"0.00", b"987"]);
        assert_eq!(text.scope_line.as_bytes(), b"Scope: Example Clinic");
        assert_eq!(text.period_line.as_bytes(), b"Period: March 2026");
    }

    #[test]
    fn bad_provider_name_names_its_row() {
        let err = ReportText::encode(
            &metrics(vec![
                ProviderMetric::new("Dr. Ok", 1.0),
                ProviderMetric::new("Dr. \u{0416}", 2.0),
            ]),
            &LayoutConfig::default(),
        )
        .err()
        .unwrap();
        assert_eq!(
            err,
            RenderError::Encoding {
                field: "provider_breakdown[1].name".to_string(),
                character: '\u{0416}',
                position: 4,
            }
        );
    }

    #[test]
    fn unencodable_configured_title_fails() {
        let mut config = LayoutConfig::default();
        config.document.title = "Report \u{2713}".to_string();
        let err = ReportRenderer::new(config)
            .render(&metrics(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, RenderError::Encoding { ref field, .. } if field == "document.title"));
    }

    #[test]
    fn try_new_rejects_invalid_layout() {
        let mut config = LayoutConfig::default();
        config.table.shade_gray = f32::NAN;
        assert!(ReportRenderer::try_new(config).is_err());
        assert!(ReportRenderer::try_new(LayoutConfig::default()).is_ok());
    }

    #[test]
    fn renderer_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReportRenderer>();
    }
}
