use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use onco_model::{DerivationIssue, IssueSeverity, Response};

use crate::types::{AnalysisResult, DeriveResult};

pub fn print_summary(result: &DeriveResult) {
    println!("Assessments: {}", result.assessments.display());
    if result.dry_run {
        println!("Dry run: no outputs written");
    } else {
        println!("Output: {}", result.output_dir.display());
    }

    let summary = &result.summary;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Best response"),
        header_cell("Patients"),
        header_cell("Percent"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for response in Response::ALL {
        let count = summary.bor.get(response);
        table.add_row(vec![
            response_cell(response),
            count_cell(count),
            Cell::new(percent(count, summary.derived)),
        ]);
    }
    table.add_row(vec![
        Cell::new("ORR (CR + PR)")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.objective_responses).add_attribute(Attribute::Bold),
        Cell::new(format!("{:.1}%", summary.orr() * 100.0)).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.derived).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");

    let mut cohort = Table::new();
    cohort.set_header(vec![header_cell("Cohort"), header_cell("Value")]);
    apply_table_style(&mut cohort);
    align_column(&mut cohort, 1, CellAlignment::Right);
    cohort.add_row(vec![Cell::new("Progressions"), Cell::new(summary.progressions)]);
    cohort.add_row(vec![Cell::new("New therapy (ANP)"), Cell::new(summary.new_therapy)]);
    cohort.add_row(vec![Cell::new("Max TTP (cycles)"), Cell::new(summary.max_ttp)]);
    cohort.add_row(vec![
        Cell::new("Excluded"),
        count_cell_colored(summary.excluded, Color::Red),
    ]);
    cohort.add_row(vec![
        Cell::new("Warnings"),
        count_cell_colored(summary.warnings, Color::Yellow),
    ]);
    println!("{cohort}");

    print_output_paths(result);
    print_issue_table(&result.issues);
}

pub fn print_analysis_summary(result: &AnalysisResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Estimand"),
        header_cell("Records"),
        header_cell("Events"),
        header_cell("Excluded"),
        header_cell("Output"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    table.add_row(vec![
        Cell::new(result.estimand)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(result.records),
        Cell::new(result.events),
        count_cell_colored(result.excluded, Color::Red),
        Cell::new(result.output.display()),
    ]);
    println!("{table}");
}

fn print_output_paths(result: &DeriveResult) {
    for (label, path) in [
        ("CSV", result.outputs.csv.as_ref()),
        ("JSON", result.outputs.json.as_ref()),
    ] {
        if let Some(path) = path {
            println!("{label}: {}", path.display());
        }
    }
}

fn print_issue_table(issues: &[DerivationIssue]) {
    if issues.is_empty() {
        return;
    }
    let mut ordered: Vec<&DerivationIssue> = issues.iter().collect();
    ordered.sort_by(|a, b| {
        severity_rank(b.severity)
            .cmp(&severity_rank(a.severity))
            .then_with(|| a.code.cmp(&b.code))
            .then_with(|| a.subject_id.cmp(&b.subject_id))
    });
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Code"),
        header_cell("Subject"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 1, CellAlignment::Center);
    for issue in ordered {
        table.add_row(vec![
            severity_cell(issue.severity),
            Cell::new(issue.code.as_code()),
            Cell::new(&issue.subject_id),
            Cell::new(&issue.message),
        ]);
    }
    println!();
    println!("Issues:");
    println!("{table}");
}

fn percent(count: usize, total: usize) -> String {
    if total == 0 {
        "-".to_string()
    } else {
        format!("{:.1}%", count as f64 * 100.0 / total as f64)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn response_cell(response: Response) -> Cell {
    let color = match response {
        Response::Complete | Response::Partial => Color::Green,
        Response::Stable => Color::Blue,
        Response::Progressive => Color::Red,
    };
    Cell::new(format!("{} ({})", response.as_code(), response.as_str())).fg(color)
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn count_cell_colored(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn severity_cell(severity: IssueSeverity) -> Cell {
    match severity {
        IssueSeverity::Error => Cell::new("ERROR").fg(Color::Red),
        IssueSeverity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn severity_rank(severity: IssueSeverity) -> u8 {
    match severity {
        IssueSeverity::Error => 2,
        IssueSeverity::Warning => 1,
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
