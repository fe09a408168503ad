//! Search form routes.
//!
//! - `GET  /`        blank form, or a results page when `from_nav=1`
//! - `POST /`        run a search from the posted filters (`?page=N`)
//! - `POST /analyze` collector outlook for one card, then re-fetch the page

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Router,
};
use cardscope_catalog::CardCatalog;
use cardscope_core::outlook::{parse_price_figure, FormField};
use cardscope_core::{build_query, ApplicationError, CardRecord, FilterSet, OutlookPayload, PriceQuote};
use cardscope_outlook::OutlookService;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tera::{Context, Tera};
use tracing::{info, warn};
use uuid::Uuid;

pub const TEMPLATE_NAME: &str = "index.html";

const EMBEDDED_INDEX: &str = include_str!("../../../templates/index.html");

#[derive(Clone)]
pub struct SearchState {
    catalog: Arc<dyn CardCatalog>,
    outlook: Arc<OutlookService>,
    templates: Arc<Tera>,
}

impl SearchState {
    pub fn new(
        catalog: Arc<dyn CardCatalog>,
        outlook: Arc<OutlookService>,
        templates: Arc<Tera>,
    ) -> Self {
        Self { catalog, outlook, templates }
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct NavParams {
    pub from_nav: Option<String>,
    pub page: Option<String>,
    pub name: Option<String>,
    pub set_name: Option<String>,
    pub number: Option<String>,
    pub rarity: Option<String>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
}

impl NavParams {
    fn filters(&self) -> FilterSet {
        FilterSet {
            name: self.name.clone(),
            set_name: self.set_name.clone(),
            number: self.number.clone(),
            rarity: self.rarity.clone(),
            card_type: self.card_type.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParam {
    pub page: Option<String>,
}

/// Card identity and price as rendered, plus the search to restore.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub card_id: String,
    pub card_name: Option<String>,
    pub card_set: Option<String>,
    pub card_number: Option<String>,
    pub card_rarity: Option<String>,
    pub price_variant: Option<String>,
    pub price_market: Option<String>,
    pub price_mid: Option<String>,
    pub price_low: Option<String>,
    pub price_high: Option<String>,
    pub price_updated: Option<String>,
    pub page: Option<String>,
    pub name: Option<String>,
    pub set_name: Option<String>,
    pub number: Option<String>,
    pub rarity: Option<String>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
}

impl AnalyzeForm {
    pub fn payload(&self) -> OutlookPayload {
        OutlookPayload {
            card_name: self.card_name.clone(),
            card_set: self.card_set.clone(),
            card_number: self.card_number.clone(),
            card_rarity: self.card_rarity.clone(),
            price_variant: self.price_variant.clone(),
            price_market: parse_price_figure(self.price_market.as_deref()),
            price_mid: parse_price_figure(self.price_mid.as_deref()),
            price_low: parse_price_figure(self.price_low.as_deref()),
            price_high: parse_price_figure(self.price_high.as_deref()),
            price_updated: self.price_updated.clone(),
        }
    }

    fn filters(&self) -> FilterSet {
        FilterSet {
            name: self.name.clone(),
            set_name: self.set_name.clone(),
            number: self.number.clone(),
            rarity: self.rarity.clone(),
            card_type: self.card_type.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterView {
    pub name: String,
    pub set_name: String,
    pub number: String,
    pub rarity: String,
    #[serde(rename = "type")]
    pub card_type: String,
}

impl From<&FilterSet> for FilterView {
    fn from(filters: &FilterSet) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            name: text(&filters.name),
            set_name: text(&filters.set_name),
            number: text(&filters.number),
            rarity: text(&filters.rarity),
            card_type: text(&filters.card_type),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceView {
    pub variant: String,
    pub market: Option<String>,
    pub mid: Option<String>,
    pub low: Option<String>,
    pub high: Option<String>,
    pub updated_at: Option<String>,
}

impl From<&PriceQuote> for PriceView {
    fn from(quote: &PriceQuote) -> Self {
        Self {
            variant: quote.variant.clone(),
            market: quote.market.map(format_price),
            mid: quote.mid.map(format_price),
            low: quote.low.map(format_price),
            high: quote.high.map(format_price),
            updated_at: quote.updated_at.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CardView {
    pub id: String,
    pub name: String,
    pub set_name: Option<String>,
    pub number: String,
    pub rarity: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<PriceView>,
    pub fields: Vec<FormField>,
    pub outlook: Option<String>,
}

impl CardView {
    fn from_record(card: &CardRecord, outlook: Option<&(String, String)>) -> Self {
        let image_url = card
            .extra
            .get("images")
            .and_then(|images| images.get("small"))
            .and_then(Value::as_str)
            .map(ToString::to_string);

        Self {
            id: card.id.clone(),
            name: card.name.clone(),
            set_name: card.set_name().map(ToString::to_string),
            number: card.number.clone(),
            rarity: card.rarity.clone(),
            image_url,
            price: card.selected_price.as_ref().map(PriceView::from),
            fields: OutlookPayload::from_card(card).form_fields(),
            outlook: outlook
                .filter(|(card_id, _)| *card_id == card.id)
                .map(|(_, text)| text.clone()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SearchPage {
    pub filters: FilterView,
    pub searched: bool,
    pub error: Option<String>,
    pub cards: Vec<CardView>,
    pub page: u32,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
}

impl SearchPage {
    fn blank() -> Self {
        Self { page: 1, ..Self::default() }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Embedded template first, then `templates_dir/index.html` when it exists and parses.
pub fn init_templates(templates_dir: &Path) -> Arc<Tera> {
    let mut tera = Tera::default();
    if let Err(error) = tera.add_raw_template(TEMPLATE_NAME, EMBEDDED_INDEX) {
        warn!(
            event_name = "system.templates.embedded_invalid",
            error = %error,
            "embedded search template failed to parse"
        );
    }

    let override_path = templates_dir.join(TEMPLATE_NAME);
    if override_path.is_file() {
        match tera.add_template_file(&override_path, Some(TEMPLATE_NAME)) {
            Ok(()) => info!(
                event_name = "system.templates.override_loaded",
                path = %override_path.display(),
                "search template loaded from filesystem"
            ),
            Err(error) => warn!(
                event_name = "system.templates.override_invalid",
                path = %override_path.display(),
                error = %error,
                "filesystem search template rejected, using embedded template"
            ),
        }
    }

    Arc::new(tera)
}

pub fn router(state: SearchState) -> Router {
    Router::new()
        .route("/", get(index).post(search))
        .route("/analyze", post(analyze))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

type PageResult = Result<Html<String>, (StatusCode, Html<String>)>;

async fn index(State(state): State<SearchState>, Query(params): Query<NavParams>) -> PageResult {
    if params.from_nav.as_deref() != Some("1") {
        return render(&state, &SearchPage::blank());
    }

    let correlation_id = new_correlation_id();
    let page = parse_page(params.page.as_deref());
    let view = run_search(&state, params.filters(), page, None, &correlation_id).await;
    render(&state, &view)
}

async fn search(
    State(state): State<SearchState>,
    Query(params): Query<PageParam>,
    Form(filters): Form<FilterSet>,
) -> PageResult {
    let correlation_id = new_correlation_id();
    let page = parse_page(params.page.as_deref());
    let view = run_search(&state, filters, page, None, &correlation_id).await;
    render(&state, &view)
}

async fn analyze(State(state): State<SearchState>, Form(form): Form<AnalyzeForm>) -> PageResult {
    let correlation_id = new_correlation_id();
    let payload = form.payload();

    info!(
        event_name = "search.analyze.requested",
        correlation_id = %correlation_id,
        card_id = %form.card_id,
        "collector outlook requested"
    );
    let outlook = state.outlook.outlook_for(&payload).await;

    let page = parse_page(form.page.as_deref());
    let view =
        run_search(&state, form.filters(), page, Some((form.card_id, outlook)), &correlation_id)
            .await;
    render(&state, &view)
}

async fn run_search(
    state: &SearchState,
    filters: FilterSet,
    page: u32,
    outlook: Option<(String, String)>,
    correlation_id: &str,
) -> SearchPage {
    let filters = filters.normalized();
    let query = build_query(&filters);
    let mut view = SearchPage {
        filters: FilterView::from(&filters),
        searched: true,
        page,
        prev_page: (page > 1).then(|| page - 1),
        ..SearchPage::default()
    };

    match state.catalog.fetch_page(&query, page).await {
        Ok(cards) => {
            info!(
                event_name = "search.completed",
                correlation_id = %correlation_id,
                page,
                returned = cards.len(),
                "search page rendered"
            );
            if cards.len() >= state.catalog.page_size() as usize {
                view.next_page = page.checked_add(1);
            }
            view.cards =
                cards.iter().map(|card| CardView::from_record(card, outlook.as_ref())).collect();
        }
        Err(error) => {
            warn!(
                event_name = "search.catalog.failed",
                correlation_id = %correlation_id,
                page,
                query = %query,
                error = %error,
                "catalog fetch failed"
            );
            let interface = ApplicationError::from(error).into_interface(correlation_id);
            view.error = Some(interface.user_message().to_string());
        }
    }

    view
}

fn render(state: &SearchState, view: &SearchPage) -> PageResult {
    let context = Context::from_serialize(view).map_err(template_error)?;
    let html = state.templates.render(TEMPLATE_NAME, &context).map_err(template_error)?;
    Ok(Html(html))
}

fn template_error(error: tera::Error) -> (StatusCode, Html<String>) {
    warn!(event_name = "search.render.failed", error = ?error, "search template failed to render");
    (StatusCode::INTERNAL_SERVER_ERROR, Html("<h1>Template Error</h1>".to_string()))
}

/// Missing, non-numeric and zero pages all mean page 1.
fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|raw| raw.trim().parse::<u32>().ok()).filter(|page| *page >= 1).unwrap_or(1)
}

fn format_price(amount: f64) -> String {
    format!("${:.2}", amount)
}

fn new_correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}
