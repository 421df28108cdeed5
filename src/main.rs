use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::*;

use crate::{
    api::{ResourceStore, authorized::AuthorizedStore, http::HttpResourceStore},
    config::Config,
    models::{
        credential::CredentialDirectory,
        project::Project,
        session::{Role, SessionContext},
        test_case::{TestCase, TestCaseStatus},
    },
    route::Route,
    services::{
        projects::{
            CreateProjectError, CreateProjectParameters, DashboardStats, create_project,
            creation_date,
            delete_project, find_project_for, list_projects, resolve_project_ref,
            visible_projects,
        },
        report::{ProjectReport, breakdown_by_project, completion_percent},
        session::{Access, SignInError, SignInParameters, current_session, guard, sign_in, sign_out},
        test_cases::{SetStatusParameters, list_all, list_for_project, set_status},
    },
    storage::json::JsonFileSessionStorage,
    view::ViewState,
};

mod api;
mod config;
mod models;
mod route;
mod services;
mod storage;
mod ui;
mod view;

#[derive(Parser)]
#[command(
    name = "testmagic",
    about = "Manage test projects and report on test case progress from your terminal"
)]
struct Cli {
    /// Base URL of the project and test case store
    #[arg(long, global = true, env = "TESTMAGIC_API_URL")]
    api_url: Option<String>,

    /// Where the session record is kept
    #[arg(long, global = true, env = "TESTMAGIC_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as admin or tester
    Login {
        /// Role to sign in as
        #[arg(short, long, default_value = "admin")]
        role: Role,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign out and forget the session
    Logout,

    /// Show who is signed in
    Whoami,

    /// Show the dashboard for the signed-in role
    Dashboard,

    /// Open a view by its route (e.g. "/admin/project/report/3")
    Open { route: Route },

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Work with test cases
    #[command(subcommand)]
    Case(CaseCommands),

    /// Show the report for a project
    Report {
        /// Project id or name
        project: String,

        /// Print the report as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Status breakdown of every test case, grouped by project
    Summary,

    /// List the test leads and testers projects can be assigned to
    Team,
}

#[derive(Debug, Subcommand)]
enum ProjectCommands {
    /// Create a new project
    New {
        /// Project name
        name: Option<String>,

        /// triggered, ongoing or completed
        #[arg(short, long, default_value = "triggered")]
        status: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Test lead (see `testmagic team`)
        #[arg(short, long)]
        lead: Option<String>,

        /// Toggle a tester (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        tester: Vec<String>,
    },
    /// Delete a project
    Delete { project: String },
    /// List projects
    List,
    /// View a project and its test cases
    View { project: String },
}

#[derive(Debug, Subcommand)]
enum CaseCommands {
    /// List the test cases of a project
    List { project: String },
    /// Change the status of a test case
    Set {
        project: String,
        case_id: String,
        /// pending, in-progress, passed or failed
        status: TestCaseStatus,
    },
}

fn fail(message: &str) -> ! {
    ui::toast_error(message);
    std::process::exit(1);
}

struct App {
    storage: JsonFileSessionStorage,
    store: HttpResourceStore,
    directory: CredentialDirectory,
}

impl App {
    fn session(&self) -> Option<SessionContext> {
        current_session(&self.storage, &self.directory)
            .unwrap_or_else(|e| {
                fail(&format!(
                    "Failed to read session from {}: {}",
                    self.storage.path().display(),
                    e
                ))
            })
    }

    fn require_session(&self) -> SessionContext {
        match self.session() {
            Some(ctx) => ctx,
            None => {
                ui::toast_error("Please sign in first.");
                ui::render_navigation(&Route::Home);
                ui::render_home(&self.directory);
                std::process::exit(1);
            }
        }
    }

    /// Runs the guard for `route` and renders the view it lands on
    fn navigate(&self, route: Route, session: Option<SessionContext>) {
        match guard(&route, session) {
            Access::Redirect(target) => {
                let required = route.required_role().map(|r| r.as_str()).unwrap_or("any");
                ui::toast_error(&format!(
                    "{} needs a signed-in {} session.",
                    route, required
                ));
                ui::render_navigation(&target);
                ui::render_home(&self.directory);
                std::process::exit(1);
            }
            Access::Granted(session) => match (route, session) {
                (Route::Home | Route::Login, _) => ui::render_home(&self.directory),
                (Route::AddProject, Some(_)) => self.team(),
                (Route::AdminDashboard | Route::TesterDashboard, Some(ctx)) => self.dashboard(&ctx),
                (Route::ProjectDetails { id, .. }, Some(ctx)) => self.project_details(&ctx, &id),
                (Route::ProjectReport { id, .. }, Some(ctx)) => self.project_report(&ctx, &id, false),
                (_, None) => fail("Please sign in first."),
            },
        }
    }

    fn load_projects(&self, authorized: &AuthorizedStore<'_, impl ResourceStore>) -> ViewState<Vec<Project>> {
        let mut view = ViewState::new();
        let ticket = view.begin();
        view.complete(ticket, list_projects(authorized));
        view
    }

    fn load_project(
        &self,
        authorized: &AuthorizedStore<'_, impl ResourceStore>,
        reference: &str,
    ) -> Project {
        let view = self.load_projects(authorized);
        if let Some(e) = view.error() {
            tracing::warn!(error = e, "project fetch failed");
            fail("Failed to load project. Please try again.");
        }
        let projects = view.data().map(Vec::as_slice).unwrap_or_default();

        match find_project_for(projects, reference, authorized.session()) {
            Ok(project) => project.clone(),
            Err(e) => fail(&e.to_string()),
        }
    }

    fn load_cases(
        &self,
        authorized: &AuthorizedStore<'_, impl ResourceStore>,
        project: &Project,
        reference: &str,
    ) -> ViewState<Vec<TestCase>> {
        let project_id = project.id.as_deref().unwrap_or(reference);
        let mut view = ViewState::new();
        let ticket = view.begin();
        view.complete(ticket, list_for_project(authorized, project_id));
        if let Some(e) = view.error() {
            tracing::warn!(error = e, "test case fetch failed");
            ui::toast_error("Failed to load Test Cases. Please try again.");
        }
        view
    }

    fn dashboard(&self, ctx: &SessionContext) {
        let authorized = AuthorizedStore::new(&self.store, ctx);
        let view = self.load_projects(&authorized);
        if let Some(e) = view.error() {
            tracing::warn!(error = e, "project fetch failed");
            ui::toast_error("Failed to load projects. Please try again.");
        }
        let projects = view.data().map(Vec::as_slice).unwrap_or_default();
        self.render_dashboard(ctx, projects);
    }

    fn render_dashboard(&self, ctx: &SessionContext, projects: &[Project]) {
        let visible = visible_projects(projects, ctx);
        let stats = DashboardStats::from_projects(visible.iter().copied());
        let title = match ctx.role() {
            Role::Admin => String::from("Admin Dashboard"),
            Role::Tester => format!("Assigned to {}", ctx.display_name),
        };
        ui::render_dashboard(&title, &stats, &visible);
    }

    fn project_details(&self, ctx: &SessionContext, reference: &str) {
        let authorized = AuthorizedStore::new(&self.store, ctx);
        let project = self.load_project(&authorized, reference);
        let cases = self.load_cases(&authorized, &project, reference);
        let cases = cases.data().map(Vec::as_slice).unwrap_or_default();

        ui::render_project_details(&project, cases, completion_percent(cases));

        let id = project.id.clone().unwrap_or_else(|| reference.to_string());
        let here = Route::ProjectDetails {
            role: ctx.role(),
            id: id.clone(),
        };
        ui::render_links(&[
            ("Report", Some(Route::ProjectReport { role: ctx.role(), id })),
            ("Back", here.back()),
        ]);
    }

    fn project_report(&self, ctx: &SessionContext, reference: &str, as_json: bool) {
        let authorized = AuthorizedStore::new(&self.store, ctx);
        let project = self.load_project(&authorized, reference);
        let view = self.load_cases(&authorized, &project, reference);

        if as_json {
            match ProjectReport::export_json(project, &view) {
                Ok(json) => println!("{}", json),
                Err(e) => fail(&e.to_string()),
            }
        } else {
            let cases = view.data().map(Vec::as_slice).unwrap_or_default();
            ui::render_report(&ProjectReport::build(project, cases));
            let here = Route::ProjectReport {
                role: ctx.role(),
                id: reference.to_string(),
            };
            ui::render_links(&[("Back", here.back())]);
        }
    }

    /// Status breakdown over the whole test case collection, per project
    fn summary(&self) {
        let ctx = self.require_session();
        if let Access::Redirect(_) = guard(&Route::AdminDashboard, Some(ctx.clone())) {
            fail("Only admins can see the summary across projects.");
        }

        let authorized = AuthorizedStore::new(&self.store, &ctx);
        let projects = self.load_projects(&authorized);
        let mut cases = ViewState::new();
        let ticket = cases.begin();
        cases.complete(ticket, list_all(&authorized));
        if let Some(e) = cases.error() {
            tracing::warn!(error = e, "test case fetch failed");
            fail("Failed to load Test Cases. Please try again.");
        }

        let cases = cases.data().map(Vec::as_slice).unwrap_or_default();
        let projects = projects.data().map(Vec::as_slice).unwrap_or_default();
        ui::render_project_breakdown(&breakdown_by_project(cases), projects);
    }

    fn login(&self, role: Role, email: Option<String>, password: Option<String>) {
        let params = SignInParameters {
            email,
            password,
            role,
        };

        match sign_in(&self.storage, &self.directory, params) {
            Ok(result) => {
                ui::toast_success(&format!("Welcome, {}!", result.session.role));
                ui::render_navigation(&result.landing);
                let session = self.session();
                self.navigate(result.landing, session);
            }
            Err(SignInError::Validation(errors)) => {
                ui::toast_error("Please fill in the required fields.");
                ui::render_validation_errors(&errors);
                std::process::exit(1);
            }
            Err(e @ SignInError::AuthenticationFailure) => fail(&e.to_string()),
            Err(SignInError::Storage(e)) => fail(&format!("Failed to save session: {}", e)),
        }
    }

    fn logout(&self) {
        match sign_out(&self.storage) {
            Ok(route) => {
                ui::toast_success("Logout successful!");
                ui::render_navigation(&route);
                ui::render_home(&self.directory);
            }
            Err(e) => fail(&format!("Failed to clear session: {}", e)),
        }
    }

    fn whoami(&self) {
        match self.session() {
            Some(ctx) => println!(
                "{} {} {}",
                ctx.display_name.bold(),
                format!("<{}>", ctx.email()).dimmed(),
                format!("({})", ctx.role()).cyan()
            ),
            None => println!("Not signed in"),
        }
    }

    fn team(&self) {
        use crate::models::project::{TEST_LEADS, TESTERS};

        ui::render_section_header("Test Leads");
        for lead in TEST_LEADS {
            println!("  {} {}", "•".green(), lead);
        }
        ui::render_section_header("Testers");
        for tester in TESTERS {
            println!("  {} {}", "•".green(), tester);
        }
        println!();
    }

    fn new_project(&self, params: CreateProjectParameters) {
        let ctx = self.require_session();
        if let Access::Redirect(_) = guard(&Route::AddProject, Some(ctx.clone())) {
            fail("Only admins can add projects.");
        }

        let authorized = AuthorizedStore::new(&self.store, &ctx);
        let today = creation_date(jiff::Timestamp::now());

        match create_project(&authorized, params, today) {
            Ok(project) => {
                ui::toast_success("Project added successfully!");
                ui::render_project_card(&project);
                ui::render_navigation(&Route::AdminDashboard);
            }
            Err(CreateProjectError::Validation(errors)) => {
                ui::toast_error("Please fill in all mandatory fields.");
                ui::render_validation_errors(&errors);
                std::process::exit(1);
            }
            Err(CreateProjectError::Access(e)) => {
                tracing::warn!(error = %e, "project creation failed");
                fail("Something went wrong. Please try again.");
            }
        }
    }

    fn remove_project(&self, reference: &str) {
        let ctx = self.require_session();
        if let Access::Redirect(_) = guard(&Route::AdminDashboard, Some(ctx.clone())) {
            fail("Only admins can delete projects.");
        }

        let authorized = AuthorizedStore::new(&self.store, &ctx);
        let mut view = self.load_projects(&authorized);
        if let Some(e) = view.error() {
            tracing::warn!(error = e, "project fetch failed");
            fail("Failed to load projects. Please try again.");
        }

        // Unknown references are still sent so the store decides
        let id = view
            .data()
            .and_then(|projects| resolve_project_ref(projects, reference))
            .and_then(|p| p.id.clone())
            .unwrap_or_else(|| reference.to_string());

        let deleted = match delete_project(&authorized, &id) {
            Ok(()) => {
                ui::toast_success("Project deleted");
                view.remount();
                let ticket = view.begin();
                view.complete(ticket, list_projects(&authorized));
                if let Some(e) = view.error() {
                    tracing::warn!(error = e, "project fetch failed");
                    ui::toast_error("Failed to load projects. Please try again.");
                }
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, id = %id, "project deletion failed");
                ui::toast_error("Failed to delete project");
                false
            }
        };

        let projects = view.data().map(Vec::as_slice).unwrap_or_default();
        self.render_dashboard(&ctx, projects);

        if !deleted {
            std::process::exit(1);
        }
    }

    fn set_case_status(&self, reference: &str, case_id: String, status: TestCaseStatus) {
        let ctx = self.require_session();
        let route = Route::ProjectDetails {
            role: Role::Tester,
            id: reference.to_string(),
        };
        if let Access::Redirect(_) = guard(&route, Some(ctx.clone())) {
            fail("Only testers can change test case status.");
        }

        let authorized = AuthorizedStore::new(&self.store, &ctx);
        let project = self.load_project(&authorized, reference);
        let view = self.load_cases(&authorized, &project, reference);
        if view.error().is_some() {
            std::process::exit(1);
        }
        let cases = view.data().cloned().unwrap_or_default();

        let params = SetStatusParameters {
            test_case_id: case_id,
            status,
        };
        let case_id = params.test_case_id.clone();

        match set_status(&authorized, cases, params) {
            Ok(updated) => {
                ui::toast_success(&format!("Test case {} marked {}", case_id, status));
                ui::render_project_details(&project, &updated, completion_percent(&updated));
            }
            Err(e) => fail(&e.to_string()),
        }
    }
}

fn main() {
    config::load_dotenv();
    let cli = Cli::parse();
    config::init_tracing();

    let config = Config::resolve(cli.api_url, cli.session_file);
    tracing::debug!(api_url = %config.api_url, session_file = %config.session_file.display(), "configuration resolved");

    let store = match HttpResourceStore::new(&config.api_url) {
        Ok(store) => store,
        Err(e) => fail(&e.to_string()),
    };

    let app = App {
        storage: JsonFileSessionStorage::new(config.session_file),
        store,
        directory: CredentialDirectory::demo(),
    };

    match cli.command {
        Some(Commands::Login {
            role,
            email,
            password,
        }) => app.login(role, email, password),
        Some(Commands::Logout) => app.logout(),
        Some(Commands::Whoami) => app.whoami(),
        Some(Commands::Dashboard) => {
            let ctx = app.require_session();
            app.navigate(Route::landing(ctx.role()), Some(ctx));
        }
        Some(Commands::Open { route }) => {
            let session = app.session();
            app.navigate(route, session);
        }
        Some(Commands::Project(ProjectCommands::New {
            name,
            status,
            description,
            lead,
            tester,
        })) => app.new_project(CreateProjectParameters {
            name,
            status: Some(status),
            description,
            test_lead: lead,
            testers: tester,
        }),
        Some(Commands::Project(ProjectCommands::Delete { project })) => {
            app.remove_project(&project)
        }
        Some(Commands::Project(ProjectCommands::List)) => {
            let ctx = app.require_session();
            app.dashboard(&ctx);
        }
        Some(Commands::Project(ProjectCommands::View { project }))
        | Some(Commands::Case(CaseCommands::List { project })) => {
            let ctx = app.require_session();
            let route = Route::ProjectDetails {
                role: ctx.role(),
                id: project,
            };
            app.navigate(route, Some(ctx));
        }
        Some(Commands::Case(CaseCommands::Set {
            project,
            case_id,
            status,
        })) => app.set_case_status(&project, case_id, status),
        Some(Commands::Report { project, json }) => {
            let ctx = app.require_session();
            let route = Route::ProjectReport {
                role: ctx.role(),
                id: project.clone(),
            };
            if let Access::Redirect(_) = guard(&route, Some(ctx.clone())) {
                fail("Please sign in first.");
            }
            app.project_report(&ctx, &project, json);
        }
        Some(Commands::Summary) => app.summary(),
        Some(Commands::Team) => app.team(),
        None => match app.session() {
            Some(ctx) => app.navigate(Route::landing(ctx.role()), Some(ctx)),
            None => ui::render_home(&app.directory),
        },
    }
}
