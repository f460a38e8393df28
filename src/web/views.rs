//! HTML rendering for the task pages.
//!
//! The views are a thin collaborator: handlers hand over ready-made
//! contexts and get a full page back. No store access, no business logic,
//! every dynamic value escaped.

use axum::response::Html;

use super::tasks::TaskForm;
use crate::task::{FieldErrors, FieldKind, Task, FORM_FIELDS};

/// Escape a value for embedding in HTML text or attributes.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Wrap page content in the shared document shell.
fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    ))
}

/// The list page: every task title linked to its detail page.
pub fn task_list(tasks: &[Task]) -> Html<String> {
    let mut body = String::from("<h1>Tasks</h1>\n<ul>\n");
    for task in tasks {
        body.push_str(&format!(
            "  <li><a href=\"/task/{}/\">{}</a></li>\n",
            task.id,
            escape(&task.title)
        ));
    }
    body.push_str("</ul>\n<a href=\"/task/new/\">Add new task</a>");
    layout("Tasks", &body)
}

/// The detail page for one task.
pub fn task_detail(task: &Task) -> Html<String> {
    let due = match task.due_date {
        Some(date) => date.to_string(),
        None => "-".to_string(),
    };
    let body = format!(
        "<h1>{}</h1>\n\
         <p>{}</p>\n\
         <p>Due: {}</p>\n\
         <p>Tags: {}</p>\n\
         <a href=\"/task/{}/edit/\">Edit</a>\n\
         <form method=\"post\" action=\"/task/{}/delete/\">\n  <button type=\"submit\">Delete</button>\n</form>\n\
         <a href=\"/\">Back to list</a>",
        escape(&task.title),
        escape(&task.description),
        escape(&due),
        escape(&task.tags),
        task.id,
        task.id
    );
    layout(&task.title, &body)
}

/// The create/update form. One widget per schema field; per-field error
/// messages appear next to their label.
pub fn task_form(form: &TaskForm, errors: &FieldErrors, is_edit: bool) -> Html<String> {
    let heading = if is_edit { "Edit Task" } else { "New Task" };
    let submit = if is_edit { "Save" } else { "Create" };

    let mut body = format!("<h1>{}</h1>\n<form method=\"post\">\n", heading);
    for spec in FORM_FIELDS {
        let value = escape(form.value(spec.name));
        body.push_str("  <p>\n");
        body.push_str(&format!(
            "    <label for=\"id_{}\">{}</label>\n",
            spec.name, spec.label
        ));
        if let Some(message) = errors.get(spec.name) {
            body.push_str(&format!(
                "    <span class=\"error\">{}</span>\n",
                escape(message)
            ));
        }
        match spec.kind {
            FieldKind::MultiLine => body.push_str(&format!(
                "    <textarea id=\"id_{}\" name=\"{}\">{}</textarea>\n",
                spec.name, spec.name, value
            )),
            FieldKind::Date => body.push_str(&format!(
                "    <input type=\"date\" id=\"id_{}\" name=\"{}\" value=\"{}\">\n",
                spec.name, spec.name, value
            )),
            FieldKind::Text => body.push_str(&format!(
                "    <input type=\"text\" id=\"id_{}\" name=\"{}\" value=\"{}\">\n",
                spec.name, spec.name, value
            )),
        }
        body.push_str("  </p>\n");
    }
    body.push_str(&format!(
        "  <button type=\"submit\">{}</button>\n</form>\n<a href=\"/\">Back to list</a>",
        submit
    ));
    layout(heading, &body)
}

/// The delete confirmation page.
pub fn confirm_delete(task: &Task) -> Html<String> {
    let body = format!(
        "<h1>Delete Task</h1>\n\
         <p>Are you sure you want to delete \"{}\"?</p>\n\
         <form method=\"post\">\n  <button type=\"submit\">Yes, delete</button>\n</form>\n\
         <a href=\"/\">Back to list</a>",
        escape(&task.title)
    );
    layout("Delete Task", &body)
}

/// Body of the 404 page.
pub fn not_found() -> Html<String> {
    layout(
        "Not Found",
        "<h1>Not Found</h1>\n<p>No such task.</p>\n<a href=\"/\">Back to list</a>",
    )
}

/// Body of the 500 page.
pub fn internal_error() -> Html<String> {
    layout(
        "Server Error",
        "<h1>Server Error</h1>\n<p>Something went wrong. Please try again later.</p>",
    )
}
