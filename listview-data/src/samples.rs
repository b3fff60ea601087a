//! Built-in datasets — typed records for the three stock views.
//!
//! - `CurrencyPair`: the live FX board (derived `movement` category)
//! - `Order`: the admin orders table
//! - `Task`: the project task list
//!
//! Each record type carries its own schema. `generate_orders` builds large
//! deterministic datasets for benchmarks and the `sample` command.

use std::borrow::Cow;

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use listview_core::{FieldKind, FieldSpec, FieldValue, Record, Schema};

/// Which built-in dataset to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSet {
    Forex,
    Orders,
    Tasks,
}

impl SampleSet {
    pub const ALL: [SampleSet; 3] = [Self::Forex, Self::Orders, Self::Tasks];

    pub fn name(self) -> &'static str {
        match self {
            Self::Forex => "forex",
            Self::Orders => "orders",
            Self::Tasks => "tasks",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(raw.trim()))
    }

    pub fn schema(self) -> Schema {
        match self {
            Self::Forex => CurrencyPair::schema(),
            Self::Orders => Order::schema(),
            Self::Tasks => Task::schema(),
        }
    }
}

// ── Currency pairs ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub symbol: String,
    /// Session open, the reference for `change`.
    pub open: f64,
    pub price: f64,
    /// Percent change since open.
    pub change: f64,
    pub volume: f64,
}

impl CurrencyPair {
    /// Build a pair from its current price and percent change.
    pub fn new(symbol: impl Into<String>, price: f64, change: f64, volume: f64) -> Self {
        Self {
            symbol: symbol.into(),
            open: price / (1.0 + change / 100.0),
            price,
            change,
            volume,
        }
    }

    pub fn base(&self) -> &str {
        self.symbol.split('/').next().unwrap_or(&self.symbol)
    }

    pub fn quote(&self) -> &str {
        self.symbol.split('/').nth(1).unwrap_or("")
    }

    /// `gainers`, `losers` or `unchanged`, from the sign of `change`.
    pub fn movement(&self) -> &'static str {
        if self.change > 0.0 {
            "gainers"
        } else if self.change < 0.0 {
            "losers"
        } else {
            "unchanged"
        }
    }

    pub fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::new("symbol", FieldKind::Text).searchable().labeled("Pair"),
            FieldSpec::new("base", FieldKind::Category).searchable(),
            FieldSpec::new("quote", FieldKind::Category).searchable(),
            FieldSpec::new("price", FieldKind::Number).labeled("Price"),
            FieldSpec::new("change", FieldKind::Number).labeled("Chg %"),
            FieldSpec::new("volume", FieldKind::Number).labeled("Volume"),
            FieldSpec::new("movement", FieldKind::Category),
        ])
    }
}

impl Record for CurrencyPair {
    fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.symbol)
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "symbol" => Some(FieldValue::Text(Cow::Borrowed(&self.symbol))),
            "base" => Some(FieldValue::Text(Cow::Borrowed(self.base()))),
            "quote" => Some(FieldValue::Text(Cow::Borrowed(self.quote()))),
            "price" => Some(FieldValue::Number(self.price)),
            "change" => Some(FieldValue::Number(self.change)),
            "volume" => Some(FieldValue::Number(self.volume)),
            "movement" => Some(FieldValue::Text(Cow::Borrowed(self.movement()))),
            _ => None,
        }
    }
}

/// The FX board shown on the dashboard.
pub fn forex_pairs() -> Vec<CurrencyPair> {
    vec![
        CurrencyPair::new("EUR/USD", 1.0854, 0.5, 1_250_000.0),
        CurrencyPair::new("GBP/USD", 1.2671, -0.2, 880_000.0),
        CurrencyPair::new("USD/JPY", 151.62, 1.1, 2_040_000.0),
        CurrencyPair::new("AUD/USD", 0.6552, -0.7, 410_000.0),
        CurrencyPair::new("USD/CHF", 0.9031, 0.0, 365_000.0),
        CurrencyPair::new("EUR/GBP", 0.8566, 0.3, 290_000.0),
    ]
}

// ── Orders ───────────────────────────────────────────────────────────

pub const ORDER_STATUSES: [&str; 4] = ["pending", "paid", "shipped", "refunded"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer: String,
    pub status: String,
    pub total: f64,
    pub placed_on: NaiveDate,
}

impl Order {
    pub fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::new("id", FieldKind::Text).searchable().labeled("Order"),
            FieldSpec::new("customer", FieldKind::Text).searchable().labeled("Customer"),
            FieldSpec::new("status", FieldKind::Category).labeled("Status"),
            FieldSpec::new("total", FieldKind::Number).labeled("Total"),
            FieldSpec::new("placed_on", FieldKind::Date).labeled("Placed"),
        ])
    }
}

impl Record for Order {
    fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.id)
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(Cow::Borrowed(&self.id))),
            "customer" => Some(FieldValue::Text(Cow::Borrowed(&self.customer))),
            "status" => Some(FieldValue::Text(Cow::Borrowed(&self.status))),
            "total" => Some(FieldValue::Number(self.total)),
            "placed_on" => Some(FieldValue::Date(self.placed_on)),
            _ => None,
        }
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

fn order(id: &str, customer: &str, status: &str, total: f64, placed_on: NaiveDate) -> Order {
    Order {
        id: id.into(),
        customer: customer.into(),
        status: status.into(),
        total,
        placed_on,
    }
}

pub fn orders() -> Vec<Order> {
    vec![
        order("ORD-1001", "Ada Lovelace", "paid", 129.99, date(2024, 3, 2)),
        order("ORD-1002", "Grace Hopper", "pending", 54.50, date(2024, 3, 3)),
        order("ORD-1003", "Alan Turing", "shipped", 310.00, date(2024, 3, 3)),
        order("ORD-1004", "Katherine Johnson", "refunded", 18.75, date(2024, 3, 5)),
        order("ORD-1005", "Linus Torvalds", "paid", 77.20, date(2024, 3, 8)),
        order("ORD-1006", "Margaret Hamilton", "shipped", 245.10, date(2024, 3, 9)),
        order("ORD-1007", "Ada Lovelace", "pending", 12.00, date(2024, 3, 11)),
        order("ORD-1008", "Barbara Liskov", "paid", 488.00, date(2024, 3, 14)),
    ]
}

const CUSTOMERS: [&str; 8] = [
    "Ada Lovelace",
    "Grace Hopper",
    "Alan Turing",
    "Katherine Johnson",
    "Linus Torvalds",
    "Margaret Hamilton",
    "Barbara Liskov",
    "Edsger Dijkstra",
];

/// Deterministic synthetic orders for a given seed.
pub fn generate_orders(n: usize, seed: u64) -> Vec<Order> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = date(2024, 1, 1);
    (0..n)
        .map(|i| {
            let customer = CUSTOMERS[rng.gen_range(0..CUSTOMERS.len())];
            let status = ORDER_STATUSES[rng.gen_range(0..ORDER_STATUSES.len())];
            let total = (rng.gen_range(5.0..500.0_f64) * 100.0).round() / 100.0;
            let placed_on = start + Duration::days(rng.gen_range(0..366));
            order(&format!("ORD-{:06}", i + 1), customer, status, total, placed_on)
        })
        .collect()
}

// ── Tasks ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub assignee: String,
    pub priority: String,
    pub status: String,
    pub due: Option<NaiveDate>,
}

impl Task {
    pub fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::new("id", FieldKind::Text),
            FieldSpec::new("title", FieldKind::Text).searchable().labeled("Task"),
            FieldSpec::new("assignee", FieldKind::Text).searchable().labeled("Owner"),
            FieldSpec::new("priority", FieldKind::Category).labeled("Priority"),
            FieldSpec::new("status", FieldKind::Category).labeled("Status"),
            FieldSpec::new("due", FieldKind::Date).labeled("Due"),
        ])
    }
}

impl Record for Task {
    fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.id)
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Text(Cow::Borrowed(&self.id))),
            "title" => Some(FieldValue::Text(Cow::Borrowed(&self.title))),
            "assignee" => Some(FieldValue::Text(Cow::Borrowed(&self.assignee))),
            "priority" => Some(FieldValue::Text(Cow::Borrowed(&self.priority))),
            "status" => Some(FieldValue::Text(Cow::Borrowed(&self.status))),
            "due" => self.due.map(FieldValue::Date),
            _ => None,
        }
    }
}

fn task(id: &str, title: &str, assignee: &str, priority: &str, status: &str, due: Option<NaiveDate>) -> Task {
    Task {
        id: id.into(),
        title: title.into(),
        assignee: assignee.into(),
        priority: priority.into(),
        status: status.into(),
        due,
    }
}

pub fn tasks() -> Vec<Task> {
    vec![
        task("T-1", "Design onboarding flow", "maya", "high", "in_progress", Some(date(2024, 4, 12))),
        task("T-2", "Fix billing webhook retries", "omar", "urgent", "todo", Some(date(2024, 4, 5))),
        task("T-3", "Write release notes", "maya", "low", "done", Some(date(2024, 3, 29))),
        task("T-4", "Migrate analytics events", "li", "medium", "todo", None),
        task("T-5", "Audit access logs", "omar", "high", "done", Some(date(2024, 4, 1))),
        task("T-6", "Refresh pricing page", "li", "medium", "in_progress", Some(date(2024, 4, 20))),
    ]
}
