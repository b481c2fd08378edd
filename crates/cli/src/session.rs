//! `intake run` -- interactive form session.
//!
//! Renders the visible fields to stdout and applies line commands from
//! stdin. After every edit the session recomputes visibility and
//! reconciles store registrations with the rendered tree (exactly one
//! register or unregister per transition), then re-runs validation so
//! blurred fields show current messages. Messages display only for fields
//! that are both visible and touched; submission marks every field touched
//! so all failures surface at once.

use std::fmt;
use std::io::{self, BufRead, Write};

use intake_core::person::{FormDef, InputKind};
use intake_core::{compute_visibility, run_submit, SchemaError, SubmitOutcome};
use intake_state::{FormStore, StoreError};

/// Errors that end or interrupt a session step.
#[derive(Debug)]
pub enum SessionError {
    Store(StoreError),
    Schema(SchemaError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Store(e) => write!(f, "{}", e),
            SessionError::Schema(e) => write!(f, "schema error: {}", e),
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Store(e)
    }
}

impl From<SchemaError> for SessionError {
    fn from(e: SchemaError) -> Self {
        SessionError::Schema(e)
    }
}

/// Outcome of one submission attempt inside the session.
pub enum SubmitStep {
    /// Validation failed; errors are attached to the store for display.
    Rejected(usize),
    /// The value set was emitted. Carries the payload for printing.
    Submitted(serde_json::Value),
}

/// One interactive form session over a store.
pub struct Session {
    form: FormDef,
    store: FormStore,
}

impl Session {
    pub fn new(form: FormDef) -> Session {
        let fields: Vec<&str> = form.fields.iter().map(|f| f.name).collect();
        let store = FormStore::new(&fields, &form.initial_values);
        let session = Session { form, store };
        // Initial render sweep: mount every field the rules leave visible.
        session.sync_registrations();
        session
    }

    pub fn store(&self) -> &FormStore {
        &self.store
    }

    /// Reconcile store registrations with the currently computed
    /// visibility. Each transition registers or deregisters exactly once.
    fn sync_registrations(&self) {
        let visibility = compute_visibility(&self.store.values(), &self.form.visibility);
        for field in &self.form.fields {
            let should = visibility.is_visible(field.name);
            // Fields come from the form definition, so lookups cannot fail.
            let is = self.store.visible(field.name).unwrap_or(false);
            if should && !is {
                let _ = self.store.register(field.name);
            } else if !should && is {
                let _ = self.store.unregister(field.name);
            }
        }
    }

    /// Re-run validation over the full value set and attach the fresh
    /// result to the store.
    fn revalidate(&self) -> Result<(), SessionError> {
        let errors = intake_core::validate(&self.store.values(), &self.form.schema)?;
        self.store.apply_errors(&errors);
        Ok(())
    }

    /// Apply an edit to one field, then resync visibility and validation.
    pub fn set(&self, field: &str, value: &str) -> Result<(), SessionError> {
        self.store.set_value(field, value)?;
        self.sync_registrations();
        self.revalidate()
    }

    /// Mark a field blurred so its message (if any) becomes visible.
    pub fn blur(&self, field: &str) -> Result<(), SessionError> {
        self.store.blur(field)?;
        self.revalidate()
    }

    /// Force-reassert a field's registration. Idempotent: a field that is
    /// already mounted keeps visible = true.
    pub fn touch(&self, field: &str) -> Result<(), SessionError> {
        self.store.register(field)?;
        Ok(())
    }

    /// Run one submission attempt over the current value set.
    pub fn submit(&self) -> Result<SubmitStep, SessionError> {
        let mut payload = None;
        let result = run_submit(&self.store.values(), &self.form.schema, |emitted| {
            payload = Some(emitted)
        })?;

        match result.outcome {
            SubmitOutcome::Submitted => {
                // The sink runs exactly once on this path.
                let payload = payload.unwrap_or(serde_json::Value::Null);
                Ok(SubmitStep::Submitted(payload))
            }
            SubmitOutcome::Rejected => {
                // A submit attempt touches every field so all failures
                // surface, then attaches the fresh result.
                for field in &self.form.fields {
                    let _ = self.store.blur(field.name);
                }
                self.store.apply_errors(&result.errors);
                Ok(SubmitStep::Rejected(result.errors.len()))
            }
        }
    }

    /// Render the currently visible fields with values and any displayable
    /// messages (visible AND touched).
    pub fn render(&self) -> String {
        let visibility = compute_visibility(&self.store.values(), &self.form.visibility);
        let mut out = String::new();
        for field in &self.form.fields {
            if !visibility.is_visible(field.name) {
                continue;
            }
            let value = self.store.value(field.name).unwrap_or_default();
            let meta = match self.store.meta(field.name) {
                Ok(m) => m,
                Err(_) => continue,
            };
            let shown = if value.is_empty() {
                "(empty)"
            } else {
                value.as_str()
            };
            let kind = match field.kind {
                InputKind::Text => "text",
                InputKind::Date => "date",
            };
            out.push_str(&format!("  {} [{}]: {}\n", field.label, kind, shown));
            if meta.touched {
                if let Some(message) = &meta.error {
                    out.push_str(&format!("      ! {}\n", message));
                }
            }
        }
        out
    }
}

/// Run the interactive REPL. Returns the process exit code.
pub fn run(quiet: bool) -> i32 {
    let session = Session::new(intake_core::person::form());

    if !quiet {
        println!();
        println!("  Intake form session");
        println!("  Commands: set <field> <value>, blur <field>, touch <field>, show, submit, quit");
        println!();
        print!("{}", session.render());
    }

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("intake> ");
        if io::stdout().flush().is_err() {
            break;
        }

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => {
                // EOF (Ctrl-D)
                println!();
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("error reading input: {}", e);
                break;
            }
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let parts: Vec<&str> = trimmed.splitn(3, char::is_whitespace).collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "set" => {
                if parts.len() < 2 {
                    eprintln!("usage: set <field> <value>");
                    continue;
                }
                let field = parts[1];
                let value = parts.get(2).copied().unwrap_or("");
                match session.set(field, value) {
                    Ok(()) => {
                        if !quiet {
                            print!("{}", session.render());
                        }
                    }
                    Err(e) => {
                        if let Some(code) = report_step_error(e) {
                            return code;
                        }
                    }
                }
            }
            "blur" => {
                if parts.len() < 2 {
                    eprintln!("usage: blur <field>");
                    continue;
                }
                match session.blur(parts[1]) {
                    Ok(()) => {
                        if !quiet {
                            print!("{}", session.render());
                        }
                    }
                    Err(e) => {
                        if let Some(code) = report_step_error(e) {
                            return code;
                        }
                    }
                }
            }
            "touch" => {
                if parts.len() < 2 {
                    eprintln!("usage: touch <field>");
                    continue;
                }
                match session.touch(parts[1]) {
                    Ok(()) => {
                        if !quiet {
                            print!("{}", session.render());
                        }
                    }
                    Err(e) => {
                        if let Some(code) = report_step_error(e) {
                            return code;
                        }
                    }
                }
            }
            "show" => {
                print!("{}", session.render());
            }
            "submit" => match session.submit() {
                Ok(SubmitStep::Submitted(payload)) => {
                    match serde_json::to_string_pretty(&payload) {
                        Ok(pretty) => println!("{}", pretty),
                        Err(e) => eprintln!("serialization error: {}", e),
                    }
                    println!("submitted");
                    return 0;
                }
                Ok(SubmitStep::Rejected(count)) => {
                    println!("{} error(s)", count);
                    print!("{}", session.render());
                }
                Err(e) => {
                    if let Some(code) = report_step_error(e) {
                        return code;
                    }
                }
            },
            "quit" | "exit" => {
                break;
            }
            _ => {
                eprintln!("unknown command: {}", cmd);
            }
        }
    }

    0
}

/// Report a step error. Store errors (an unknown field name typed at the
/// prompt) are recoverable; schema errors are fatal and return an exit
/// code.
fn report_step_error(error: SessionError) -> Option<i32> {
    match error {
        SessionError::Store(e) => {
            eprintln!("{}", e);
            None
        }
        SessionError::Schema(e) => {
            eprintln!("schema error: {}", e);
            Some(1)
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
