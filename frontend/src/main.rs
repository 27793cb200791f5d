mod api;

use gloo_timers::callback::Interval;
use js_sys::Date;
use serde_json::Value;
use shared::{HealthResponse, ResultView};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlTextAreaElement;
use yew::prelude::*;

const HEALTH_POLL_MS: u32 = 15_000;

enum HealthState {
    Unknown,
    Ok { time: i64 },
    Unreachable,
}

enum Msg {
    // Health polling
    CheckHealth,
    HealthChecked(Option<HealthResponse>),

    // Submission cycle
    Submit(SubmitEvent),
    Classified(Value),
    SubmitFailed(String),
}

struct App {
    health: HealthState,
    loading: bool,
    error: Option<String>,
    result: Option<Value>,
    message_ref: NodeRef,
    _health_poll: Option<Interval>,
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::CheckHealth);
        let link = ctx.link().clone();
        let poll = Interval::new(HEALTH_POLL_MS, move || {
            link.send_message(Msg::CheckHealth);
        });

        Self {
            health: HealthState::Unknown,
            loading: false,
            error: None,
            result: None,
            message_ref: NodeRef::default(),
            _health_poll: Some(poll),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::CheckHealth => {
                let link = ctx.link().clone();
                spawn_local(async move {
                    link.send_message(Msg::HealthChecked(api::check_health().await.ok()));
                });
                false
            }
            Msg::HealthChecked(response) => self.handle_health_checked(response),
            Msg::Submit(event) => self.handle_submit(ctx, event),
            Msg::Classified(payload) => {
                self.result = Some(payload);
                self.loading = false;
                true
            }
            Msg::SubmitFailed(message) => {
                self.error = Some(message);
                self.loading = false;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { self.render_header() }
                <main class="main-content">
                    { self.render_form(ctx) }
                    { self.render_loading() }
                    { self.render_error() }
                    { self.render_result() }
                </main>
            </div>
        }
    }
}

// Handler methods
impl App {
    fn handle_health_checked(&mut self, response: Option<HealthResponse>) -> bool {
        self.health = match response {
            Some(h) if h.status == "ok" => HealthState::Ok { time: h.time },
            _ => HealthState::Unreachable,
        };
        true
    }

    fn handle_submit(&mut self, ctx: &Context<Self>, event: SubmitEvent) -> bool {
        event.prevent_default();
        // Stale-state reset before validating the new submission.
        self.error = None;
        self.result = None;

        let message = self
            .message_ref
            .cast::<HtmlTextAreaElement>()
            .map(|el| el.value())
            .unwrap_or_default()
            .trim()
            .to_string();

        if message.is_empty() {
            self.error = Some("Please enter a message".to_string());
            return true;
        }

        self.loading = true;
        let link = ctx.link().clone();
        spawn_local(async move {
            match api::submit_message(message).await {
                Ok(payload) => link.send_message(Msg::Classified(payload)),
                Err(e) => link.send_message(Msg::SubmitFailed(e)),
            }
        });
        true
    }
}

// Rendering methods
impl App {
    fn render_header(&self) -> Html {
        let (text, state_class) = match &self.health {
            HealthState::Ok { time } => (
                format!("Backend OK ({})", format_local_time(*time)),
                Some("good"),
            ),
            HealthState::Unreachable => ("Backend unreachable".to_string(), Some("bad")),
            HealthState::Unknown => ("Checking backend...".to_string(), None),
        };

        html! {
            <header class="app-header">
                <h1>{"UPay Fraud Check"}</h1>
                <span id="health" class={classes!("health", state_class)}>{ text }</span>
            </header>
        }
    }

    fn render_form(&self, ctx: &Context<Self>) -> Html {
        let onsubmit = ctx.link().callback(Msg::Submit);
        html! {
            <form id="msgForm" {onsubmit}>
                <label for="message">{"Message to check"}</label>
                <textarea
                    id="message"
                    ref={self.message_ref.clone()}
                    placeholder="Paste the suspicious message here"
                    rows="4"
                />
                <button type="submit" disabled={self.loading}>
                    { if self.loading { "Checking..." } else { "Check message" } }
                </button>
            </form>
        }
    }

    fn render_loading(&self) -> Html {
        if self.loading {
            html! { <p id="loading" class="loading">{"Analyzing message..."}</p> }
        } else {
            html! {}
        }
    }

    fn render_error(&self) -> Html {
        if let Some(error_msg) = &self.error {
            html! {
                <div id="errorSection" class="error-message">
                    <p id="errorMsg">{ error_msg }</p>
                </div>
            }
        } else {
            html! {}
        }
    }

    fn render_result(&self) -> Html {
        let Some(payload) = &self.result else {
            return html! {};
        };
        let view = ResultView::from_value(payload);
        let raw = serde_json::to_string_pretty(payload).unwrap_or_default();

        html! {
            <section id="resultSection" class="result-panel">
                <h2>{"Verdict"}</h2>
                <span id="resultBadge" class={classes!("badge", view.verdict.css_class())}>
                    { view.badge_text().to_string() }
                </span>
                <dl class="result-fields">
                    <dt>{"Decision"}</dt>
                    <dd id="decision">{ view.result.clone() }</dd>
                    <dt>{"Document id"}</dt>
                    <dd id="docId">{ view.doc_id.clone() }</dd>
                    <dt>{"After hours"}</dt>
                    <dd id="afterHours">{ view.after_hours.to_string() }</dd>
                    <dt>{"Origin"}</dt>
                    <dd id="origin">{ view.origin.clone() }</dd>
                </dl>
                <pre id="raw">{ raw }</pre>
            </section>
        }
    }
}

fn format_local_time(unix_secs: i64) -> String {
    let date = Date::new(&JsValue::from_f64(unix_secs as f64 * 1000.0));
    String::from(date.to_locale_time_string("default"))
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<App>::new().render();
}
