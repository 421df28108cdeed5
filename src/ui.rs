use std::collections::BTreeMap;

use colored::*;

use crate::{
    models::{
        credential::CredentialDirectory,
        project::{Project, ProjectStatus},
        test_case::{TestCase, TestCaseStatus},
    },
    route::Route,
    services::{
        projects::{DashboardStats, counter_completion_percent},
        report::{ChartPoint, ProjectReport, StatusCounts, percent},
        validation::ValidationErrors,
    },
};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

pub fn toast_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn toast_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.red());
}

pub fn render_validation_errors(errors: &ValidationErrors) {
    for error in errors.fields() {
        eprintln!("  {} {}", format!("{}:", error.field).red().bold(), error.message);
    }
}

pub fn render_navigation(route: &Route) {
    println!("{} {}", "→".dimmed(), route.path().dimmed());
}

/// Follow-up views, printed as commands that open them
pub fn render_links(links: &[(&str, Option<Route>)]) {
    for (label, route) in links {
        if let Some(route) = route {
            println!("  {} testmagic open {}", format!("{}:", label).dimmed(), route);
        }
    }
    println!();
}

pub fn project_status_badge(status: ProjectStatus) -> ColoredString {
    let label = format!(" {} ", status);
    match status {
        ProjectStatus::Triggered => label.black().on_yellow(),
        ProjectStatus::Ongoing => label.white().on_blue(),
        ProjectStatus::Completed => label.black().on_green(),
    }
}

pub fn test_case_status_badge(status: TestCaseStatus) -> ColoredString {
    let label = format!("{:<11}", status.label());
    match status {
        TestCaseStatus::Pending => label.yellow(),
        TestCaseStatus::InProgress => label.blue(),
        TestCaseStatus::Passed => label.green(),
        TestCaseStatus::Failed => label.red(),
    }
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize, noun: &str) {
    let word = if count == 1 {
        noun.to_string()
    } else {
        format!("{}s", noun)
    };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, word);
}

/// Render a section header (e.g., "Test Cases", "Executive Summary")
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

/// Progress bar that fills most of the terminal, followed by the percentage
pub fn render_progress_bar(percent: u8) {
    let width = get_terminal_width().saturating_sub(20).clamp(10, 60);
    let filled = width * usize::from(percent.min(100)) / 100;
    println!(
        "  {}{} {}",
        "█".repeat(filled).green(),
        "░".repeat(width - filled).dimmed(),
        format!("{}% completed", percent).bold()
    );
}

pub fn render_home(directory: &CredentialDirectory) {
    println!("\n  {}\n", "TestMagic".cyan().bold());
    println!("  Sign in with `testmagic login --role <admin|tester> --email <email> --password <password>`\n");
    println!("  {}", "Demo credentials".dimmed());
    for credential in directory.iter() {
        println!(
            "    {} {} / {}",
            format!("{}:", credential.role).bold(),
            credential.email,
            credential.password
        );
    }
    println!();
}

pub fn render_stats(stats: &DashboardStats) {
    println!(
        "  {} {}   {} {}   {} {}   {} {}",
        stats.total.to_string().bold(),
        "total".dimmed(),
        stats.triggered.to_string().yellow().bold(),
        "triggered".dimmed(),
        stats.ongoing.to_string().blue().bold(),
        "ongoing".dimmed(),
        stats.completed.to_string().green().bold(),
        "completed".dimmed(),
    );
}

pub fn render_project_card(project: &Project) {
    let id = project.id.as_deref().unwrap_or("-");
    println!(
        "{} {}  {}  {}",
        "•".green(),
        project.name.bold(),
        project_status_badge(project.status),
        format!("#{}", id).dimmed()
    );
    println!(
        "    {} {} {} {}",
        "Lead:".dimmed(),
        project.test_lead,
        "•".dimmed(),
        format!("Created on {}", project.created_at.strftime("%b %d, %Y")).dimmed()
    );
    if !project.testers.is_empty() {
        println!("    {} {}", "Testers:".dimmed(), project.testers.join(", "));
    }
    println!(
        "    {} {}",
        format!(
            "{}/{} test cases",
            project.completed_test_cases, project.total_test_cases
        )
        .dimmed(),
        format!("{}% Complete", counter_completion_percent(project)).bold()
    );
    println!("    {}", "─".repeat(30).dimmed());
    println!();
}

pub fn render_dashboard(title: &str, stats: &DashboardStats, projects: &[&Project]) {
    render_view_header(title, projects.len(), "project");
    render_stats(stats);
    println!();

    if projects.is_empty() {
        println!("  No projects found");
        return;
    }

    for project in projects {
        render_project_card(project);
    }
}

fn render_project_info(project: &Project) {
    println!("\n  {}  {}\n", project.name.green().bold(), project_status_badge(project.status));
    println!("  {:<12}{}", "Test Lead".dimmed(), project.test_lead);
    println!(
        "  {:<12}{}",
        "Testers".dimmed(),
        if project.testers.is_empty() {
            String::from("-")
        } else {
            project.testers.join(", ")
        }
    );
    println!(
        "  {:<12}{}",
        "Created".dimmed(),
        project.created_at.strftime("%b %d, %Y")
    );
    if let Some(description) = &project.description {
        println!("  {:<12}{}", "About".dimmed(), description);
    }
}

pub fn render_test_case_line(case: &TestCase) {
    let id_str = format!("{:>4}", case.id);
    let left = format!("  {}  {}  {}", id_str.dimmed(), test_case_status_badge(case.status), case.title);

    let context: Vec<String> = [
        case.priority.map(|p| p.label().to_string()),
        case.tester.clone(),
    ]
    .into_iter()
    .flatten()
    .collect();

    if context.is_empty() {
        println!("{}", left);
        return;
    }

    let right = context.join(" · ");
    let visible_left = 2 + id_str.chars().count() + 2 + 11 + 2 + case.title.chars().count();
    let total = visible_left + right.chars().count();
    let terminal_width = get_terminal_width();

    if total + 4 < terminal_width {
        let padding = terminal_width - total - 2;
        println!("{}{}{}", left, " ".repeat(padding), right.dimmed());
    } else {
        println!("{}", left);
    }
}

pub fn render_project_details(project: &Project, cases: &[TestCase], percent: u8) {
    render_project_info(project);

    render_section_header("Overall Completion Progress");
    render_progress_bar(percent);

    render_section_header(&format!("Test Cases ({})", cases.len()));
    if cases.is_empty() {
        println!("  No test cases found.");
    }
    for case in cases {
        render_test_case_line(case);
    }
    println!();
}

fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    let channel = |range: std::ops::Range<usize>| {
        hex.trim_start_matches('#')
            .get(range)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(255)
    };
    (channel(0..2), channel(2..4), channel(4..6))
}

pub fn render_status_counts(counts: &StatusCounts) {
    let cells: Vec<String> = counts
        .iter()
        .map(|(status, count)| {
            format!(
                "{} {}",
                test_case_status_badge(status).bold(),
                count.to_string().bold()
            )
        })
        .collect();
    println!("  {}", cells.join("   "));
}

/// Horizontal bar chart, one bar per status in the fixed order
pub fn render_bar_chart(series: &[ChartPoint]) {
    let max = series.iter().map(|p| p.count).max().unwrap_or(0);
    let width = get_terminal_width().saturating_sub(24).clamp(10, 50);

    for point in series {
        let len = if max == 0 { 0 } else { point.count * width / max };
        let (r, g, b) = hex_to_rgb(point.color);
        println!(
            "  {:<12}{} {}",
            point.name,
            "▇".repeat(len).truecolor(r, g, b),
            point.count
        );
    }
}

/// Per-project status counts; project ids are shown with their names when known
pub fn render_project_breakdown(breakdown: &BTreeMap<String, StatusCounts>, projects: &[Project]) {
    render_view_header("Test Cases by Project", breakdown.len(), "project");

    if breakdown.is_empty() {
        println!("  No test cases found.");
        return;
    }

    for (key, counts) in breakdown {
        let name = projects
            .iter()
            .find(|p| p.id.as_deref() == Some(key.as_str()))
            .map(|p| p.name.as_str())
            .unwrap_or(key.as_str());
        println!(
            "{} {}  {}",
            "•".green(),
            name.bold(),
            format!("{}% resolved", percent(counts.resolved(), counts.total())).dimmed()
        );
        print!("  ");
        render_status_counts(counts);
        println!();
    }
}

pub fn render_report(report: &ProjectReport) {
    render_project_info(&report.project);
    println!("  {:<12}{}", "Test Cases".dimmed(), report.total);

    render_section_header("Progress Overview");
    render_status_counts(&report.status_counts);
    println!();
    render_progress_bar(report.completion_percent);

    render_section_header("Test Case Status Overview");
    render_bar_chart(&report.chart);

    if !report.by_tester.is_empty() {
        render_section_header("By Tester");
        for (tester, counts) in &report.by_tester {
            println!(
                "  {:<20}{} resolved of {}",
                tester,
                counts.resolved().to_string().bold(),
                counts.total()
            );
        }
    }

    render_section_header("By Priority");
    let priorities: Vec<String> = report
        .priority_counts
        .iter()
        .map(|(priority, count)| format!("{} {}", priority.label().dimmed(), count))
        .collect();
    println!("  {}", priorities.join("   "));

    render_section_header("Executive Summary");
    println!("  {}", "Key Achievements".green().bold());
    for line in report.summary.achievements() {
        println!("    • {}", line);
    }
    let concerns = report.summary.concerns();
    if !concerns.is_empty() {
        println!("\n  {}", "Areas of Concern".red().bold());
        for line in concerns {
            println!("    • {}", line);
        }
    }
    println!();
}
