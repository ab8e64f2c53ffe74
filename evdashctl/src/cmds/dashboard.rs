//! Interactive dashboard.
//!
//! Commands are read one per line, the page is printed again after everything that changes
//! it.  Errors are printed and we go on, only `quit` or the end of input stop the session.
//!
//! A page is printed as soon as the data is there, locations still on their placeholder.  It is
//! printed once more when the lookups started for it have landed.
//!

use std::io::{BufRead, Write};
use std::str::FromStr;

use eyre::Result;
use tracing::{debug, info, trace, warn};

use crate::binder::Binding;
use crate::cli::DashboardOpts;
use crate::error::Status;
use crate::form::FilterForm;
use crate::query::VehicleQuery;
use crate::route::{Route, Target};
use crate::runtime::Context;
use crate::view::VehiclesView;

const PROMPT: &str = "evdash> ";

const HELP: &str = r##"Commands:
  next | prev           move between pages
  page [N]              show the current page number or jump to page N
  date A[..B]           set both dates of the filter
  begin D | end D       set one side of the date filter, `-` to remove it
  provider NAME         provider filter, `all` for every one
  vehicle ID            vehicle filter, `-` to remove it
  clear                 reset the filter form
  apply                 use the filter form
  show                  display the page and the filter form
  go PATH               open another page (`/` or `/vehicles`)
  providers             list provider choices
  stats                 geocoding statistics
  help                  this text
  quit                  exit
"##;

/// Everything one can type
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Next,
    Prev,
    Page(Option<u32>),
    Date(String),
    Begin(String),
    End(String),
    Provider(String),
    Vehicle(String),
    Clear,
    Apply,
    Show,
    Go(String),
    Providers,
    Stats,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = Status;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (cmd, arg) = match s.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (s, ""),
        };
        let need = |name: &'static str| {
            if arg.is_empty() {
                Err(Status::MissingArgument(name))
            } else {
                Ok(arg.to_string())
            }
        };

        Ok(match cmd.to_lowercase().as_str() {
            "next" | "n" => Command::Next,
            "prev" | "p" => Command::Prev,
            "page" if arg.is_empty() => Command::Page(None),
            "page" => Command::Page(Some(
                arg.parse()
                    .map_err(|_| Status::BadParameter("page", arg.to_string()))?,
            )),
            "date" => Command::Date(need("date")?),
            "begin" => Command::Begin(need("begin")?),
            "end" => Command::End(need("end")?),
            "provider" => Command::Provider(need("provider")?),
            "vehicle" => Command::Vehicle(need("vehicle")?),
            "clear" => Command::Clear,
            "apply" => Command::Apply,
            "show" => Command::Show,
            "go" => Command::Go(need("go")?),
            "providers" => Command::Providers,
            "stats" => Command::Stats,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => return Err(Status::UnknownCommand(cmd.to_string())),
        })
    }
}

#[derive(Debug)]
pub struct Dashboard {
    ctx: Context,
    query: VehicleQuery,
    route: Option<Route>,
    form: FilterForm,
    view: VehiclesView,
}

impl Dashboard {
    pub fn new(ctx: Context) -> Self {
        let query = ctx.query();
        Dashboard {
            ctx,
            query,
            route: None,
            form: FilterForm::new(),
            view: VehiclesView::default(),
        }
    }

    #[inline]
    pub fn route(&self) -> Option<Route> {
        self.route
    }

    #[inline]
    pub fn form(&self) -> &FilterForm {
        &self.form
    }

    #[inline]
    pub fn view(&self) -> &VehiclesView {
        &self.view
    }

    /// Open `path`.  Opening a page always builds it from scratch, locations included.
    ///
    #[tracing::instrument(skip(self))]
    pub async fn go(&mut self, path: &str) -> Result<String> {
        let route = Route::resolve(path)?;
        let mut out = String::new();
        if let Ok(Target::Redirect(to)) = Route::lookup(path) {
            out.push_str(&format!("Redirected to {}\n", to));
        }

        info!("mount {}", route);
        self.route = Some(route);
        self.form = FilterForm::new();
        self.view = VehiclesView::default().with_rows(self.query.limit());

        out.push_str(&self.refresh().await);
        Ok(out)
    }

    /// Fetch the current page, start the lookups for what is new and render.
    ///
    async fn refresh(&mut self) -> String {
        self.view.load(&self.query).await;
        let n = self.view.bind_locations(self.ctx.resolver.clone());
        trace!("{} lookups started", n);
        self.view.apply_reports();
        self.view.render()
    }

    /// Wait for the lookups of the current page.  Returns the page again if some location
    /// came in, `None` if there is nothing new to show.
    ///
    #[tracing::instrument(skip(self))]
    pub async fn settle(&mut self) -> Option<String> {
        if self.view.is_settled() {
            return None;
        }
        let res = self.view.settle().await;
        trace!("bindings: {:?}", res);
        res.contains(&Binding::Reported).then(|| self.view.render())
    }

    fn page(&self) -> Result<Route, Status> {
        self.route.ok_or(Status::NotFound("no page, use go /vehicles".to_string()))
    }

    /// Run one command, `None` means we are done.
    ///
    #[tracing::instrument(skip(self))]
    pub async fn execute(&mut self, cmd: Command) -> Result<Option<String>> {
        let out = match cmd {
            Command::Quit => return Ok(None),
            Command::Help => HELP.to_string(),
            Command::Go(path) => self.go(&path).await?,
            Command::Stats => format!(
                "{} cached={}",
                self.ctx.resolver.stats(),
                self.ctx.resolver.cache().len()
            ),
            Command::Date(range) => {
                self.form.set_range(&range)?;
                format!("Filters: {}", self.form)
            }
            Command::Begin(date) => {
                self.form.set_begin(&date)?;
                format!("Filters: {}", self.form)
            }
            Command::End(date) => {
                self.form.set_end(&date)?;
                format!("Filters: {}", self.form)
            }
            Command::Provider(provider) => {
                self.form.set_provider(&provider);
                format!("Filters: {}", self.form)
            }
            Command::Vehicle(id) => {
                self.form.set_vehicle(&id);
                format!("Filters: {}", self.form)
            }
            Command::Clear => {
                self.form.clear();
                format!("Filters: {}", self.form)
            }
            Command::Providers => self.view.providers().join(", "),
            Command::Show => {
                self.page()?;
                format!("{}Filters: {}", self.view.render(), self.form)
            }
            Command::Apply => {
                self.page()?;
                let filter = self.form.apply()?;
                self.view.set_filter(filter);
                self.refresh().await
            }
            Command::Next => {
                self.page()?;
                if !self.view.next() {
                    return Ok(Some("Next is disabled".to_string()));
                }
                self.refresh().await
            }
            Command::Prev => {
                self.page()?;
                if !self.view.prev() {
                    return Ok(Some("Previous is disabled".to_string()));
                }
                self.refresh().await
            }
            Command::Page(None) => {
                self.page()?;
                self.view.footer()
            }
            Command::Page(Some(n)) => {
                self.page()?;
                if !self.view.goto(n) {
                    return Err(Status::BadParameter("page", n.to_string()).into());
                }
                self.refresh().await
            }
        };
        Ok(Some(out))
    }

    /// Read commands from `input` until `quit` or the end of it.
    ///
    pub async fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                write!(out, "{}", PROMPT)?;
                out.flush()?;
                continue;
            }
            debug!("command {:?}", line);

            let res = match line.parse::<Command>() {
                Ok(cmd) => self.execute(cmd).await,
                Err(e) => Err(e.into()),
            };
            match res {
                Ok(Some(text)) => writeln!(out, "{}", text.trim_end())?,
                Ok(None) => return Ok(()),
                Err(e) => {
                    warn!("{}", e);
                    writeln!(out, "Error: {}", e)?;
                }
            }
            out.flush()?;
            self.show_locations(out).await?;
            write!(out, "{}", PROMPT)?;
            out.flush()?;
        }
        Ok(())
    }

    /// Print the page again once its locations are there.
    ///
    async fn show_locations<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if let Some(page) = self.settle().await {
            writeln!(out, "{}", page.trim_end())?;
            out.flush()?;
        }
        Ok(())
    }
}

/// Open the start page then hand over to the operator.
///
#[tracing::instrument(skip(ctx, input, out))]
pub async fn run_dashboard<R: BufRead, W: Write>(
    ctx: &Context,
    opts: &DashboardOpts,
    input: R,
    out: &mut W,
) -> Result<()> {
    let mut dash = Dashboard::new(ctx.clone());
    match dash.go(&opts.start).await {
        Ok(page) => writeln!(out, "{}", page.trim_end())?,
        Err(e) => writeln!(out, "Error: {}", e)?,
    }
    out.flush()?;
    dash.show_locations(out).await?;
    dash.run(input, out).await
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    use httpmock::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    use crate::config::Config;
    use crate::view::PLACEHOLDER;

    use super::*;

    #[rstest]
    #[case("next", Command::Next)]
    #[case("  prev ", Command::Prev)]
    #[case("page", Command::Page(None))]
    #[case("page 3", Command::Page(Some(3)))]
    #[case("date 2024-03-01..2024-03-02", Command::Date("2024-03-01..2024-03-02".into()))]
    #[case("provider all", Command::Provider("all".into()))]
    #[case("vehicle  EV 42 ", Command::Vehicle("EV 42".into()))]
    #[case("go /", Command::Go("/".into()))]
    #[case("QUIT", Command::Quit)]
    fn test_parse_command(#[case] line: &str, #[case] cmd: Command) {
        assert_eq!(Ok(cmd), line.parse::<Command>());
    }

    #[rstest]
    #[case("fly", Status::UnknownCommand("fly".into()))]
    #[case("go", Status::MissingArgument("go"))]
    #[case("begin", Status::MissingArgument("begin"))]
    #[case("page two", Status::BadParameter("page", "two".into()))]
    fn test_parse_command_bad(#[case] line: &str, #[case] err: Status) {
        assert_eq!(Err(err), line.parse::<Command>());
    }

    fn page_body(page: u32, total_pages: u32) -> serde_json::Value {
        json!({
            "data": [{
                "vehicle_id": format!("V{page}"),
                "registration_number": "DL01AB1234",
                "timestamp": "2024-03-15T10:20:30Z",
                "latitude": 28.6139,
                "longitude": 77.209,
                "speed": 42.5,
                "odometer": 1234.5,
                "battery_soc": 55,
                "vehicle_status": "moving",
                "oem_provider": "Ather"
            }],
            "pagination": {"page": page, "per_page": 10, "total_pages": total_pages, "total_records": 2}
        })
    }

    fn setup_ctx(api: &MockServer, geo: &MockServer) -> Context {
        let mut cfg = Config::default();
        cfg.api.url = api.base_url();
        cfg.geocoder.url = geo.base_url();
        cfg.geocoder.delay = "0s".to_string();
        Context::new(cfg).unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_session() {
        let api = MockServer::start_async().await;
        let geo = MockServer::start_async().await;

        let mut p1 = api
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/dashboard/data")
                    .query_param("page", "1");
                then.status(200).json_body(page_body(1, 2));
            })
            .await;
        let p2 = api
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/dashboard/data")
                    .query_param("page", "2");
                then.status(200).json_body(page_body(2, 2));
            })
            .await;
        let reverse = geo
            .mock_async(|when, then| {
                when.method(GET).path("/reverse");
                then.status(200)
                    .json_body(json!({"address": {"city": "New Delhi", "state": "Delhi"}}));
            })
            .await;

        let mut dash = Dashboard::new(setup_ctx(&api, &geo));
        let page = dash.go("/").await.unwrap();
        assert!(page.contains("Redirected to /vehicles"));
        assert!(page.contains("Page 1 of 2 | prev: disabled | next: enabled"));
        let page = dash.settle().await.unwrap();
        assert!(page.contains("New Delhi"));

        // Location kept from the previous page, nothing to wait for
        let page = dash.execute(Command::Next).await.unwrap().unwrap();
        assert!(page.contains("Page 2 of 2 | prev: enabled | next: disabled"));
        assert!(page.contains("New Delhi"));
        assert_eq!(None, dash.settle().await);
        assert_eq!(
            Some("Next is disabled".to_string()),
            dash.execute(Command::Next).await.unwrap()
        );

        let draft = dash.execute(Command::Provider("Tata".into())).await.unwrap();
        assert_eq!(
            Some("Filters: begin=- end=- provider=Tata vehicle=-".to_string()),
            draft
        );
        // Draft only
        assert_eq!(None, dash.view().filter().provider);
        assert_eq!(2, dash.view().page());
        assert_eq!(
            Some("all, Switch, Tata, Ather".to_string()),
            dash.execute(Command::Providers).await.unwrap()
        );

        p1.assert_hits_async(1).await;
        p2.assert_hits_async(1).await;
        p1.delete_async().await;

        let tata = api
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/dashboard/data")
                    .query_param("page", "1")
                    .query_param("oem_provider", "Tata");
                then.status(200).json_body(page_body(1, 1));
            })
            .await;

        let page = dash.execute(Command::Apply).await.unwrap().unwrap();
        assert_eq!(None, dash.settle().await);
        assert_eq!(1, dash.view().page());
        assert!(page.contains("Page 1 of 1 | prev: disabled | next: disabled"));
        tata.assert_hits_async(1).await;

        // Same position on every page
        reverse.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_dashboard_run() {
        let api = MockServer::start_async().await;
        let geo = MockServer::start_async().await;
        let _m = api
            .mock_async(|when, then| {
                when.method(GET).path("/dashboard/data");
                then.status(200).json_body(page_body(1, 1));
            })
            .await;
        let _r = geo
            .mock_async(|when, then| {
                when.method(GET).path("/reverse");
                then.status(200).json_body(json!({"address": {"town": "Gurugram"}}));
            })
            .await;

        let ctx = setup_ctx(&api, &geo);
        let input = Cursor::new("help\n\nfly\nstats\nquit\nnext\n");
        let mut out = Vec::new();
        run_dashboard(&ctx, &DashboardOpts { start: "/".into() }, input, &mut out)
            .await
            .unwrap();
        let out = String::from_utf8(out).unwrap();

        // Placeholder first, then the location
        let loading = out.find(PLACEHOLDER).unwrap();
        let town = out.find("Gurugram").unwrap();
        assert!(loading < town);
        assert!(out.contains("Commands:"));
        assert!(out.contains("Error: Unknown command fly, try help"));
        assert!(out.contains("hits=0 miss=1 errors=0 cached=1"));
        // Nothing after quit
        assert!(!out.contains("Next is disabled"));
    }

    #[tokio::test]
    async fn test_dashboard_page_before_locations() {
        let api = MockServer::start_async().await;
        let geo = MockServer::start_async().await;
        let _m = api
            .mock_async(|when, then| {
                when.method(GET).path("/dashboard/data");
                then.status(200).json_body(page_body(1, 1));
            })
            .await;
        let reverse = geo
            .mock_async(|when, then| {
                when.method(GET).path("/reverse");
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(json!({"address": {"city": "New Delhi", "state": "Delhi"}}));
            })
            .await;

        let mut dash = Dashboard::new(setup_ctx(&api, &geo));
        let start = Instant::now();
        let page = dash.go("/vehicles").await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(page.contains(PLACEHOLDER));
        assert!(!page.contains("New Delhi"));

        let page = dash.settle().await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(page.contains("New Delhi"));
        assert!(!page.contains(PLACEHOLDER));
        reverse.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_dashboard_error_page() {
        let api = MockServer::start_async().await;
        let geo = MockServer::start_async().await;
        let _m = api
            .mock_async(|when, then| {
                when.method(GET).path("/dashboard/data");
                then.status(502);
            })
            .await;

        let mut dash = Dashboard::new(setup_ctx(&api, &geo));
        let page = dash.go("/vehicles").await.unwrap();
        assert_eq!("Error loading vehicles data", page);
        assert_eq!(Some(Route::Vehicles), dash.route());
    }

    #[tokio::test]
    async fn test_dashboard_not_found() {
        let api = MockServer::start_async().await;
        let geo = MockServer::start_async().await;

        let mut dash = Dashboard::new(setup_ctx(&api, &geo));
        assert!(dash.go("/nowhere").await.is_err());
        assert_eq!(None, dash.route());
        assert!(dash.execute(Command::Next).await.is_err());
        assert_eq!(Some(HELP.to_string()), dash.execute(Command::Help).await.unwrap());
    }
}
