//! Google Calendar tools

use super::{http_client, Tool, ToolError};
use crate::config::CalendarConfig;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Calendar API access shared by the calendar tools
pub struct CalendarClient {
    client: Client,
    access_token: Option<String>,
    calendar_id: String,
    timezone: Tz,
    base_url: String,
}

impl CalendarClient {
    pub fn new(config: &CalendarConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client()?,
            access_token: config.access_token.clone(),
            calendar_id: config.calendar_id.clone(),
            timezone: config.timezone,
            base_url: config.base_url.clone(),
        })
    }

    fn token(&self) -> Result<&str, ToolError> {
        self.access_token
            .as_deref()
            .ok_or_else(|| ToolError::new("Google Calendar is not configured (GOOGLE_CALENDAR_TOKEN unset)"))
    }

    fn events_url(&self) -> Result<Url, ToolError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ToolError::new(format!("Invalid calendar API URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ToolError::new("Calendar API URL cannot have a path"))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }

    /// Send a request and hand back either the JSON body or a message for the
    /// model describing what went wrong.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Result<Value, String>, ToolError> {
        let response = match request.bearer_auth(self.token()?).send().await {
            Ok(r) => r,
            Err(e) => return Ok(Err(format!("Google Calendar request failed: {e}"))),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => return Ok(Err(format!("Failed to read Google Calendar response: {e}"))),
        };

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Google Calendar API error");
            return Ok(Err(google_error_message(status.as_u16(), &body)));
        }

        Ok(serde_json::from_str(&body)
            .map_err(|e| format!("Unreadable Google Calendar response: {e}")))
    }
}

/// Fetches events for one day
pub struct FetchCalendarEventsTool {
    calendar: Arc<CalendarClient>,
}

impl FetchCalendarEventsTool {
    pub fn new(calendar: Arc<CalendarClient>) -> Self {
        Self { calendar }
    }
}

#[derive(Debug, Deserialize)]
struct FetchInput {
    date: String,
}

#[async_trait]
impl Tool for FetchCalendarEventsTool {
    fn name(&self) -> &str {
        "fetch_calendar_events"
    }

    fn description(&self) -> String {
        "Get a list of Google Calendar events for a specific date.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "date": {
                    "type": "string",
                    "description": "The date to fetch events for, in YYYY-MM-DD format."
                }
            },
            "required": ["date"]
        })
    }

    async fn run(&self, args: Map<String, Value>) -> Result<Value, ToolError> {
        let input: FetchInput = match serde_json::from_value(Value::Object(args)) {
            Ok(i) => i,
            Err(e) => return Ok(domain_error(format!("Invalid input: {e}"))),
        };

        let (time_min, time_max) = match day_bounds(&input.date, self.calendar.timezone) {
            Ok(bounds) => bounds,
            Err(message) => return Ok(domain_error(message)),
        };

        tracing::debug!(date = %input.date, %time_min, %time_max, "Fetching calendar events");

        let request = self.calendar.client.get(self.calendar.events_url()?).query(&[
            ("timeMin", time_min.as_str()),
            ("timeMax", time_max.as_str()),
            ("singleEvents", "true"),
            ("orderBy", "startTime"),
        ]);

        Ok(match self.calendar.send(request).await? {
            Ok(body) => Value::Array(simplify_events(&body)),
            Err(message) => domain_error(message),
        })
    }
}

/// Inserts a timed event
pub struct AddCalendarEventTool {
    calendar: Arc<CalendarClient>,
}

impl AddCalendarEventTool {
    pub fn new(calendar: Arc<CalendarClient>) -> Self {
        Self { calendar }
    }
}

#[derive(Debug, Deserialize)]
struct AddInput {
    summary: String,
    date: String,
    start_time: String,
    end_time: String,
}

#[async_trait]
impl Tool for AddCalendarEventTool {
    fn name(&self) -> &str {
        "add_calendar_event"
    }

    fn description(&self) -> String {
        "Add a new event to the Google Calendar.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "The title or summary of the event (e.g., 'Dentist Appointment')."
                },
                "date": {
                    "type": "string",
                    "description": "The date of the event, in YYYY-MM-DD format."
                },
                "start_time": {
                    "type": "string",
                    "description": "The event start time in 24-hour HH:MM format (e.g., '14:30')."
                },
                "end_time": {
                    "type": "string",
                    "description": "The event end time in 24-hour HH:MM format (e.g., '15:30')."
                }
            },
            "required": ["summary", "date", "start_time", "end_time"]
        })
    }

    async fn run(&self, args: Map<String, Value>) -> Result<Value, ToolError> {
        let input: AddInput = match serde_json::from_value(Value::Object(args)) {
            Ok(i) => i,
            Err(e) => return Ok(domain_error(format!("Invalid input: {e}"))),
        };

        let body = match event_body(&input, self.calendar.timezone) {
            Ok(body) => body,
            Err(message) => return Ok(domain_error(message)),
        };

        tracing::debug!(summary = %input.summary, date = %input.date, "Adding calendar event");

        let request = self.calendar.client.post(self.calendar.events_url()?).json(&body);

        Ok(match self.calendar.send(request).await? {
            Ok(created) => json!({
                "status": created.get("status").and_then(Value::as_str).unwrap_or("confirmed"),
                "summary": created.get("summary").cloned().unwrap_or_else(|| json!(input.summary)),
                "start": event_time(&created, "start"),
                "end": event_time(&created, "end"),
                "id": created.get("id").cloned().unwrap_or(Value::Null),
                "htmlLink": created.get("htmlLink").cloned().unwrap_or(Value::Null),
            }),
            Err(message) => domain_error(message),
        })
    }
}

fn domain_error(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

fn parse_date(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{date}', expected YYYY-MM-DD"))
}

fn localize(naive: NaiveDateTime, tz: Tz) -> Result<String, String> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.to_rfc3339())
        .ok_or_else(|| format!("{naive} does not exist in time zone {}", tz.name()))
}

/// RFC 3339 bounds covering 00:00:00 through 23:59:59 of `date` in `tz`
fn day_bounds(date: &str, tz: Tz) -> Result<(String, String), String> {
    let day = parse_date(date)?;
    let at = |h, m, s| day.and_hms_opt(h, m, s).ok_or_else(|| format!("Invalid date '{date}'"));
    let start = localize(at(0, 0, 0)?, tz)?;
    let end = localize(at(23, 59, 59)?, tz)?;
    Ok((start, end))
}

fn event_body(input: &AddInput, tz: Tz) -> Result<Value, String> {
    let day = parse_date(&input.date)?;
    let parse_time = |t: &str| {
        NaiveTime::parse_from_str(t, "%H:%M").map_err(|_| format!("Invalid time '{t}', expected HH:MM"))
    };
    let start = parse_time(&input.start_time)?;
    let end = parse_time(&input.end_time)?;
    if end <= start {
        return Err("end_time must be after start_time".to_string());
    }

    Ok(json!({
        "summary": input.summary,
        "start": {
            "dateTime": localize(day.and_time(start), tz)?,
            "timeZone": tz.name(),
        },
        "end": {
            "dateTime": localize(day.and_time(end), tz)?,
            "timeZone": tz.name(),
        },
    }))
}

/// `dateTime` for timed events, `date` for all-day ones
fn event_time(event: &Value, key: &str) -> Value {
    let slot = &event[key];
    slot.get("dateTime")
        .or_else(|| slot.get("date"))
        .cloned()
        .unwrap_or(Value::Null)
}

fn simplify_events(body: &Value) -> Vec<Value> {
    body.get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|event| {
                    json!({
                        "summary": event.get("summary").and_then(Value::as_str).unwrap_or("(no title)"),
                        "start": event_time(event, "start"),
                        "end": event_time(event, "end"),
                        "id": event.get("id").cloned().unwrap_or(Value::Null),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn google_error_message(status: u16, body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: Detail,
    }
    #[derive(Deserialize)]
    struct Detail {
        message: String,
    }

    let message = serde_json::from_str::<Envelope>(body).map_or_else(|_| body.to_string(), |e| e.error.message);
    format!("Google Calendar API error (HTTP {status}): {message}")
}
