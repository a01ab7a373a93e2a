//! Terminal rendering of a completed run.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use prep_model::{BalanceReport, ConfigFile, ProcessingConfig, RunSummary, SplitSummary};

pub fn print_summary(summary: &RunSummary) {
    println!("{}", render_summary(summary, true));
}

/// Human-readable report of a run. `styled` enables colors and bold text.
pub fn render_summary(summary: &RunSummary, styled: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("Output: {}\n", summary.output_dir.display()));
    out.push_str(&format!("Encodings: {}\n", summary.encodings_path.display()));
    out.push_str(&format!("Selected features: {}\n", summary.features_path.display()));
    out.push_str(&format!("{}\n", split_table(&summary.splits, styled)));
    out.push_str(&format!("{}\n", feature_table(summary, styled)));
    out.push_str(&format!("Finished in {:.2?}", summary.duration));
    out
}

fn split_table(splits: &[SplitSummary], styled: bool) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table, styled);
    table.set_header(vec![
        header_cell("Split"),
        header_cell("Loaded"),
        header_cell("Duplicates"),
        header_cell("Log1p"),
        header_cell("Synthetic"),
        header_cell("Classes"),
        header_cell("Rows"),
        header_cell("Columns"),
    ]);
    for column in 1..table.column_count() {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for split in splits {
        let transformed = split.skew.transformed_columns();
        table.add_row(vec![
            Cell::new(split.split)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(split.rows_loaded),
            count_cell(split.clean.duplicates_removed),
            if transformed.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(transformed.join(", "))
            },
            match &split.balance {
                Some(report) => count_cell(report.synthetic_rows),
                None => dim_cell("skipped"),
            },
            class_cell(split.balance.as_ref()),
            Cell::new(split.rows_written),
            Cell::new(split.columns_written),
        ]);
    }
    table
}

fn feature_table(summary: &RunSummary, styled: bool) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table, styled);
    table.set_header(vec![
        header_cell("Rank"),
        header_cell("Feature"),
        header_cell("Importance"),
        header_cell("Kept"),
    ]);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    let kept = summary.selected.features.len();
    for (rank, score) in summary.selected.ranking.scores().iter().enumerate() {
        let selected = rank < kept;
        let feature = if selected {
            Cell::new(&score.feature).add_attribute(Attribute::Bold)
        } else {
            dim_cell(&score.feature)
        };
        table.add_row(vec![
            Cell::new(rank + 1),
            feature,
            Cell::new(format!("{:.4}", score.importance)),
            if selected {
                Cell::new("yes").fg(Color::Green)
            } else {
                dim_cell("no")
            },
        ]);
    }
    table
}

/// Resolved configuration, defaults included, as it would appear in the file.
pub fn render_config(config: &ProcessingConfig) -> anyhow::Result<String> {
    let file = ConfigFile {
        data_processing: config.clone(),
    };
    Ok(toml::to_string_pretty(&file)?)
}

fn class_cell(report: Option<&BalanceReport>) -> Cell {
    let Some(report) = report else {
        return dim_cell("-");
    };
    let counts: Vec<String> = report
        .after
        .iter()
        .map(|class| format!("{}={}", class.class, class.count))
        .collect();
    Cell::new(counts.join(" "))
}

fn apply_table_style(table: &mut Table, styled: bool) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if !styled {
        table.force_no_tty();
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(Color::Yellow)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use prep_model::{
        ClassCount, CleanReport, FeatureRanking, FeatureScore, SelectedFeatures, SkewDecision,
        SkewReport, Split,
    };

    use super::*;

    fn run_summary() -> RunSummary {
        let split = |split: Split, balance: Option<BalanceReport>| SplitSummary {
            split,
            rows_loaded: 100,
            clean: CleanReport {
                duplicates_removed: 2,
                ..CleanReport::default()
            },
            skew: SkewReport {
                threshold: 5.0,
                decisions: vec![SkewDecision {
                    column: "lead_time".to_string(),
                    skew: 6.2,
                    transformed: true,
                }],
            },
            balance,
            rows_written: 176,
            columns_written: 3,
            output: PathBuf::from("out").join(format!("processed_{split}.csv")),
        };
        let balance = BalanceReport {
            before: vec![],
            after: vec![
                ClassCount {
                    class: "0".to_string(),
                    count: 88,
                },
                ClassCount {
                    class: "1".to_string(),
                    count: 88,
                },
            ],
            synthetic_rows: 78,
        };
        let ranking = FeatureRanking::from_scores(vec![
            FeatureScore {
                feature: "lead_time".to_string(),
                importance: 0.61,
            },
            FeatureScore {
                feature: "no_of_adults".to_string(),
                importance: 0.39,
            },
        ]);
        RunSummary {
            output_dir: PathBuf::from("out"),
            splits: vec![split(Split::Train, Some(balance)), split(Split::Test, None)],
            selected: SelectedFeatures {
                features: vec!["lead_time".to_string()],
                target: "booking_status".to_string(),
                ranking,
            },
            encodings_path: PathBuf::from("out/encodings.json"),
            features_path: PathBuf::from("out/selected_features.json"),
            duration: Duration::from_millis(1500),
        }
    }

    #[test]
    fn summary_lists_splits_and_features() {
        let rendered = render_summary(&run_summary(), false);
        assert!(rendered.contains("0=88 1=88"));
        assert!(rendered.contains("skipped"));
        assert!(rendered.contains("0.6100"));
        assert!(rendered.contains("no_of_adults"));
        assert!(!rendered.contains('\u{1b}'), "unstyled output has no escapes");
    }

    #[test]
    fn config_renders_back_to_the_same_settings() {
        let config = ProcessingConfig::new(
            vec!["room_type_reserved".to_string()],
            vec!["lead_time".to_string()],
            5.0,
            10,
        );
        let text = render_config(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&text).unwrap();
        assert_eq!(parsed.data_processing, config);
        assert!(text.contains("no_of_features = 10"));
    }
}
