//! listview CLI — query, share and explore list views from the terminal.
//!
//! Commands:
//! - `query` — filter, sort and page a dataset, print the page as a table
//! - `share` — encode criteria as a URL query string and view id, optionally save it
//! - `shell` — line-oriented interactive session over one view
//! - `sample` — write a built-in or generated dataset to CSV

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use listview_core::{Bound, Criteria, Direction, DynRecord, ListView, Range, Record, Schema, SortKey};
use listview_data::samples::{forex_pairs, generate_orders, orders, tasks};
use listview_data::{
    load_records, persistence, query_string, to_dyn_records, write_csv, CurrencyPair,
    QueryStringSync, SampleSet, Ticker, ViewConfig, ViewStore,
};

#[derive(Parser)]
#[command(name = "listview", about = "listview: filter, sort and page tabular records")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one page of a dataset after applying criteria.
    Query {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Page to show (1-based).
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page (0 = all). Defaults to the config value (20 for samples).
        #[arg(long)]
        per_page: Option<usize>,
    },
    /// Encode criteria into a shareable query string.
    Share {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Base URL or path to prefix the query string with.
        #[arg(long, default_value = "")]
        base: String,

        /// Save the view under this name in the view store.
        #[arg(long)]
        save: Option<String>,

        /// View store file. Defaults to <data dir>/listview/views.json.
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Interactive session: type `help` for commands.
    Shell {
        #[command(flatten)]
        source: SourceArgs,

        /// State file. Defaults to <data dir>/listview/<dataset>.json.
        #[arg(long)]
        state: Option<PathBuf>,

        /// Ignore any saved state and start from the defaults.
        #[arg(long, default_value_t = false)]
        fresh: bool,

        /// Rows per page (0 = all).
        #[arg(long)]
        per_page: Option<usize>,
    },
    /// Write a dataset as CSV.
    Sample {
        /// Dataset: forex, orders or tasks.
        #[arg(long, default_value = "orders")]
        set: String,

        /// Generate this many orders instead of the fixture (orders only).
        #[arg(long)]
        rows: Option<usize>,

        /// Seed for generated rows.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// Built-in dataset: forex, orders or tasks.
    #[arg(long, conflicts_with = "file")]
    sample: Option<String>,

    /// JSON or CSV record file (needs --config).
    #[arg(long, requires = "config")]
    file: Option<PathBuf>,

    /// TOML view config for --file.
    #[arg(long, requires = "file")]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
struct CriteriaArgs {
    /// Start from a query string (e.g. "q=eur&sort=change&dir=desc").
    #[arg(long)]
    url: Option<String>,

    /// Free-text search.
    #[arg(long)]
    search: Option<String>,

    /// Category selection, `field=value`. Repeatable.
    #[arg(long = "select", value_name = "FIELD=VALUE")]
    selects: Vec<String>,

    /// Inclusive range, `field=min..max` (either side may be empty). Repeatable.
    #[arg(long = "range", value_name = "FIELD=MIN..MAX")]
    ranges: Vec<String>,

    /// Sort field.
    #[arg(long)]
    sort: Option<String>,

    /// Sort descending.
    #[arg(long, default_value_t = false)]
    desc: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Query {
            source,
            criteria,
            page,
            per_page,
        } => run_query(&source, &criteria, page, per_page),
        Commands::Share {
            source,
            criteria,
            base,
            save,
            store,
        } => run_share(&source, &criteria, &base, save, store),
        Commands::Shell {
            source,
            state,
            fresh,
            per_page,
        } => run_shell(&source, state, fresh, per_page),
        Commands::Sample {
            set,
            rows,
            seed,
            out,
        } => run_sample(&set, rows, seed, out.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(verbose)
        .compact()
        .try_init();
}

// ── Datasets ─────────────────────────────────────────────────────────

/// Records plus everything needed to build a view over them.
struct Dataset {
    name: String,
    schema: Schema,
    records: Vec<DynRecord>,
    defaults: Criteria,
    per_page: usize,
    /// Typed pairs for the FX board, so `tick` can move prices.
    pairs: Option<Vec<CurrencyPair>>,
}

impl Dataset {
    fn view(&self, per_page: Option<usize>) -> ListView<DynRecord> {
        ListView::new(self.records.clone(), self.schema.clone())
            .with_defaults(self.defaults.clone())
            .with_per_page(per_page.unwrap_or(self.per_page))
    }
}

const DEFAULT_PER_PAGE: usize = 20;

fn load_dataset(source: &SourceArgs) -> Result<Dataset> {
    if let (Some(file), Some(config)) = (&source.file, &source.config) {
        let cfg = ViewConfig::from_file(config)?;
        let records = load_records(file, &cfg.schema, cfg.key_field.as_deref())
            .with_context(|| format!("loading {}", file.display()))?;
        let name = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("records")
            .to_string();
        return Ok(Dataset {
            name,
            schema: cfg.schema,
            records,
            defaults: cfg.defaults,
            per_page: cfg.per_page,
            pairs: None,
        });
    }

    let set = match source.sample.as_deref() {
        Some(raw) => parse_set(raw)?,
        None => SampleSet::Forex,
    };
    let schema = set.schema();
    let (records, pairs) = match set {
        SampleSet::Forex => {
            let pairs = forex_pairs();
            (to_dyn_records(&pairs, &schema), Some(pairs))
        }
        SampleSet::Orders => (to_dyn_records(&orders(), &schema), None),
        SampleSet::Tasks => (to_dyn_records(&tasks(), &schema), None),
    };
    Ok(Dataset {
        name: set.name().to_string(),
        schema,
        records,
        defaults: Criteria::default(),
        per_page: DEFAULT_PER_PAGE,
        pairs,
    })
}

fn parse_set(raw: &str) -> Result<SampleSet> {
    SampleSet::parse(raw).ok_or_else(|| anyhow!("unknown sample set '{raw}' (expected forex, orders or tasks)"))
}

// ── Criteria flags ───────────────────────────────────────────────────

/// Build criteria from flags on top of `base` (or a `--url` query string).
fn build_criteria(args: &CriteriaArgs, schema: &Schema, base: &Criteria) -> Result<Criteria> {
    let mut c = match &args.url {
        Some(q) => query_string::decode(q, schema),
        None => base.clone(),
    };

    if let Some(search) = &args.search {
        c.search = search.clone();
    }

    for raw in &args.selects {
        let (field, value) = raw
            .split_once('=')
            .ok_or_else(|| anyhow!("--select expects FIELD=VALUE, got '{raw}'"))?;
        match schema.kind_of(field) {
            Some(kind) if kind.is_textual() => {
                c.selectors.insert(field.to_string(), value.to_string());
            }
            Some(_) => bail!("field '{field}' is not categorical"),
            None => bail!("unknown field '{field}'"),
        }
    }

    for raw in &args.ranges {
        let (field, range) = parse_range(raw, schema)?;
        if range.is_open() {
            c.ranges.remove(&field);
        } else {
            c.ranges.insert(field, range);
        }
    }

    if let Some(field) = &args.sort {
        if schema.field(field).is_none() {
            bail!("unknown sort field '{field}'");
        }
        c.sort = Some(SortKey {
            field: field.clone(),
            direction: if args.desc { Direction::Desc } else { Direction::Asc },
        });
    } else if args.desc {
        match c.sort.as_mut() {
            Some(key) => key.direction = Direction::Desc,
            None => bail!("--desc needs a sort field"),
        }
    }
    Ok(c)
}

/// Parse `field=min..max`. Unlike interactive input, a bound that does not
/// parse is an error here.
fn parse_range(raw: &str, schema: &Schema) -> Result<(String, Range)> {
    let (field, span) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("--range expects FIELD=MIN..MAX, got '{raw}'"))?;
    let kind = schema
        .kind_of(field)
        .ok_or_else(|| anyhow!("unknown field '{field}'"))?;
    if !kind.is_rangeable() {
        bail!("field '{field}' does not support ranges");
    }
    let (lo, hi) = span.split_once("..").unwrap_or((span, span));
    let bound = |text: &str| -> Result<Option<Bound>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        schema
            .coerce(field, text)
            .and_then(Bound::from_value)
            .map(Some)
            .ok_or_else(|| anyhow!("'{text}' is not a valid bound for '{field}'"))
    };
    Ok((field.to_string(), Range::new(bound(lo)?, bound(hi)?)))
}

// ── Commands ─────────────────────────────────────────────────────────

fn run_query(source: &SourceArgs, args: &CriteriaArgs, page: usize, per_page: Option<usize>) -> Result<()> {
    let data = load_dataset(source)?;
    let criteria = build_criteria(args, &data.schema, &data.defaults)?;
    let mut view = data.view(per_page);
    view.replace_criteria(criteria);
    view.set_page(page.saturating_sub(1));

    let stdout = io::stdout();
    print_page(&mut stdout.lock(), &view)?;
    Ok(())
}

fn run_share(
    source: &SourceArgs,
    args: &CriteriaArgs,
    base: &str,
    save: Option<String>,
    store: Option<PathBuf>,
) -> Result<()> {
    let data = load_dataset(source)?;
    let criteria = build_criteria(args, &data.schema, &data.defaults)?;
    let sync = QueryStringSync::from_criteria(&criteria);

    println!("{}", sync.url(base));
    println!("View id: {}", criteria.view_id());

    if let Some(name) = save {
        let path = match store {
            Some(p) => p,
            None => default_data_dir()?.join("views.json"),
        };
        let mut views = ViewStore::open(&path)?;
        let id = views.save(&name, &criteria)?;
        println!("Saved '{name}' ({id}) to {}", path.display());
    }
    Ok(())
}

fn run_shell(
    source: &SourceArgs,
    state: Option<PathBuf>,
    fresh: bool,
    per_page: Option<usize>,
) -> Result<()> {
    let data = load_dataset(source)?;
    let state_path = match state {
        Some(p) => p,
        None => default_data_dir()?.join(format!("{}.json", data.name)),
    };

    let mut session = start_session(&data, &state_path, fresh, per_page);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "listview shell on '{}' (type `help` for commands)", data.name)?;
    print_page(&mut out, &session.view)?;
    session.run(stdin.lock(), &mut out)?;

    persistence::save(&state_path, session.view.criteria())?;
    tracing::info!(path = %state_path.display(), "criteria saved");
    Ok(())
}

/// Open a session on the dataset's defaults, then adopt the saved criteria
/// if a readable state file exists.
fn start_session(
    data: &Dataset,
    state_path: &Path,
    fresh: bool,
    per_page: Option<usize>,
) -> Session {
    let mut session = Session::new(data, per_page);
    if !fresh {
        if let Some(saved) = persistence::try_load(state_path) {
            session.view.replace_criteria(saved);
        }
    }
    session
}

fn run_sample(set: &str, rows: Option<usize>, seed: u64, out: Option<&Path>) -> Result<()> {
    let set = parse_set(set)?;
    if rows.is_some() && set != SampleSet::Orders {
        bail!("--rows only applies to the orders set");
    }
    match out {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_sample(&mut file, set, rows, seed)?;
            eprintln!("Wrote {} sample to {}", set.name(), path.display());
        }
        None => {
            let stdout = io::stdout();
            write_sample(&mut stdout.lock(), set, rows, seed)?;
        }
    }
    Ok(())
}

fn write_sample(w: &mut dyn Write, set: SampleSet, rows: Option<usize>, seed: u64) -> Result<()> {
    let schema = set.schema();
    match (set, rows) {
        (SampleSet::Orders, Some(n)) => write_csv(w, &generate_orders(n, seed), &schema)?,
        (SampleSet::Orders, None) => write_csv(w, &orders(), &schema)?,
        (SampleSet::Forex, _) => write_csv(w, &forex_pairs(), &schema)?,
        (SampleSet::Tasks, _) => write_csv(w, &tasks(), &schema)?,
    }
    Ok(())
}

fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join("listview"))
        .ok_or_else(|| anyhow!("no data directory on this platform; pass an explicit path"))
}

// ── Shell ────────────────────────────────────────────────────────────

const SHELL_HELP: &str = "\
commands:
  search [text]              set (or clear) the search
  toggle <field> <value>     select a category value, again to clear
  range <field> <min> <max>  inclusive range, `-` for an open side
  clear-range <field>        remove a range
  sort <field>               sort; again to flip direction
  unsort                     back to source order
  page <n> | next | prev     move between pages
  per-page <n>               rows per page (0 = all)
  reset                      back to the defaults
  show                       print the current page
  url                        print the current query string
  tick                       move FX prices one step (forex only)
  quit";

struct Session {
    view: ListView<DynRecord>,
    url: QueryStringSync,
    pairs: Option<Vec<CurrencyPair>>,
    ticker: Ticker,
}

impl Session {
    fn new(data: &Dataset, per_page: Option<usize>) -> Self {
        let mut view = data.view(per_page);
        let url = QueryStringSync::from_criteria(view.criteria());
        view.subscribe(Box::new(url.clone()));
        Self {
            view,
            url,
            pairs: data.pairs.clone(),
            ticker: Ticker::default(),
        }
    }

    fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            if !self.execute(line.trim(), out)? {
                break;
            }
        }
        Ok(())
    }

    /// Run one command. Returns `false` when the session should end.
    fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<bool> {
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            return Ok(true);
        };
        let rest: Vec<&str> = words.collect();

        let changed = match (cmd, rest.as_slice()) {
            ("quit" | "exit", _) => return Ok(false),
            ("help", _) => {
                writeln!(out, "{SHELL_HELP}")?;
                return Ok(true);
            }
            ("show", _) => true,
            ("url", _) => {
                writeln!(out, "?{}", self.url.current())?;
                return Ok(true);
            }
            ("search", words) => self.view.set_search(words.join(" ")),
            ("toggle", [field, value @ ..]) if !value.is_empty() => {
                self.view.toggle_category(field, &value.join(" "))
            }
            ("range", [field, min, max]) => {
                let open = |s: &str| if s == "-" { String::new() } else { s.to_string() };
                self.view.set_range_input(field, &open(*min), &open(*max))
            }
            ("clear-range", [field]) => self.view.clear_range(field),
            ("sort", [field]) => {
                if self.view.schema().field(field).is_none() {
                    writeln!(out, "unknown field '{field}'")?;
                    return Ok(true);
                }
                self.view.set_sort(field)
            }
            ("unsort", _) => self.view.clear_sort(),
            ("page", [n]) => match n.parse::<usize>() {
                Ok(n) => {
                    self.view.set_page(n.saturating_sub(1));
                    true
                }
                Err(_) => {
                    writeln!(out, "page expects a number")?;
                    return Ok(true);
                }
            },
            ("per-page", [n]) => match n.parse::<usize>() {
                Ok(n) => {
                    self.view.set_per_page(n);
                    true
                }
                Err(_) => {
                    writeln!(out, "per-page expects a number")?;
                    return Ok(true);
                }
            },
            ("next", _) => self.view.next_page(),
            ("prev", _) => self.view.prev_page(),
            ("reset", _) => self.view.reset(),
            ("tick", _) => match self.pairs.as_mut() {
                Some(pairs) => {
                    self.ticker.step(pairs);
                    let records = to_dyn_records(pairs, self.view.schema());
                    self.view.replace_records(records);
                    true
                }
                None => {
                    writeln!(out, "tick only applies to the forex sample")?;
                    return Ok(true);
                }
            },
            _ => {
                writeln!(out, "unrecognized command: {line} (try `help`)")?;
                return Ok(true);
            }
        };

        if changed {
            print_page(out, &self.view)?;
        } else {
            writeln!(out, "(no change)")?;
        }
        Ok(true)
    }
}

// ── Output ───────────────────────────────────────────────────────────

fn print_page<W: Write>(out: &mut W, view: &ListView<DynRecord>) -> io::Result<()> {
    if view.is_empty() {
        writeln!(out, "No results")?;
        return Ok(());
    }

    let schema = view.schema();
    let headers: Vec<&str> = schema.fields.iter().map(|f| f.display_label()).collect();
    let rows: Vec<Vec<String>> = view
        .page_rows()
        .map(|r| {
            schema
                .names()
                .map(|name| r.field(name).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(headers.as_slice()))?;
    writeln!(out, "{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)))?;
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        writeln!(out, "{}", line(cells.as_slice()))?;
    }

    let w = view.window();
    writeln!(
        out,
        "Page {} of {} ({} of {} records match)",
        w.page + 1,
        w.page_count,
        w.total,
        view.records().len()
    )?;
    Ok(())
}
