use crate::types::{StepResult, StepStatus};
use std::fmt::Write;

pub const PLAN_SYSTEM_PROMPT: &str = concat!(
    "You are an autonomous assistant. When the user asks you to perform a task, ",
    "respond ONLY with a JSON object matching exactly this schema:\n",
    "{\n",
    "  \"goal\": \"<short description of the objective>\",\n",
    "  \"steps\": [\n",
    "    {\n",
    "      \"tool\": \"<service.action>\",\n",
    "      \"args\": { ... },\n",
    "      \"needs_ok\": false,\n",
    "      \"ok_prompt\": null\n",
    "    }\n",
    "  ]\n",
    "}\n\n",
    "Available tools:\n",
    "- browser.open(url)\n",
    "- browser.navigate(url)\n",
    "- browser.click(element_id)\n",
    "- browser.type(element_id, text)\n",
    "- browser.extract(selector)\n",
    "- browser.screenshot()\n",
    "- browser.close()\n\n",
    "Set needs_ok=true ONLY for irreversible actions (checkout, form submission, payment). ",
    "Do not include any text outside the JSON."
);

pub const REPLY_SYSTEM_PROMPT: &str =
    "You are a voice assistant reading the result of a task aloud to the user. \
     Be brief, conversational, and speak in the past tense about what was done.";

pub fn summarize_results(results: &[StepResult]) -> String {
    let mut out = String::new();
    for r in results {
        let outcome = match r.status {
            StepStatus::Ok => format!("ok, output={}", r.output),
            StepStatus::Error => format!("error: {}", r.error.as_deref().unwrap_or("unknown")),
            StepStatus::Skipped => format!("skipped: {}", r.error.as_deref().unwrap_or("unknown")),
        };
        let _ = writeln!(out, "{}. {} -> {}", r.step_index, r.tool, outcome);
    }
    out
}
