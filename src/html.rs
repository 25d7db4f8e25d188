//! Maud building blocks shared between the HTML pages.

use maud::{DOCTYPE, Markup, PreEscaped, html};

const STYLE: &str = r#"
body {
    font-family: system-ui, sans-serif;
    margin: 0;
    background: #f9fafb;
    color: #111827;
}
main {
    max-width: 48rem;
    margin: 0 auto;
    padding: 2rem 1.5rem;
}
.card {
    max-width: 28rem;
    margin: 2rem auto;
    padding: 1.5rem 2rem;
    background: white;
    border-radius: 0.5rem;
    box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1);
}
label {
    display: block;
    margin-bottom: 0.5rem;
    font-size: 0.875rem;
    font-weight: 500;
}
input[type=text], input[type=password], input[type=number], input[type=tel],
input[type=search], select {
    display: block;
    box-sizing: border-box;
    width: 100%;
    padding: 0.6rem;
    margin-bottom: 1rem;
    border: 1px solid #d1d5db;
    border-radius: 0.25rem;
}
button {
    width: 100%;
    padding: 0.5rem 1rem;
    color: white;
    background: #2563eb;
    border: none;
    border-radius: 0.25rem;
}
table {
    width: 100%;
    border-collapse: collapse;
}
th, td {
    padding: 0.75rem 1rem;
    text-align: left;
    border-bottom: 1px solid #e5e7eb;
}
a {
    color: #2563eb;
}
.flash-error {
    color: #ef4444;
}
.flash-success {
    color: #16a34a;
}
.amount {
    text-align: right;
    font-variant-numeric: tabular-nums;
}
.inline-form {
    display: flex;
    flex-wrap: wrap;
    gap: 0.5rem;
    align-items: center;
    margin-bottom: 1rem;
}
.inline-form input, .inline-form select, .inline-form button {
    width: auto;
    margin: 0;
    padding: 0.4rem;
}
.inline-form label {
    margin: 0;
}
.totals {
    display: grid;
    grid-template-columns: max-content max-content;
    gap: 0.25rem 1rem;
}
"#;

/// Sends forms marked with `data-endpoint` to the JSON API and reloads the
/// page on success. `data-method` overrides POST, inputs of type number or
/// with `data-number` are sent as numbers, and `data-confirm` asks first.
/// Errors are shown in the form's `.flash-error` paragraph.
const JSON_FORM_SCRIPT: &str = r#"
document.addEventListener("submit", async (event) => {
    const form = event.target;
    const endpoint = form.dataset.endpoint;
    if (!endpoint) {
        return;
    }
    event.preventDefault();

    if (form.dataset.confirm && !window.confirm(form.dataset.confirm)) {
        return;
    }

    const method = form.dataset.method || "POST";
    const payload = {};
    for (const input of form.querySelectorAll("[name]")) {
        const isNumber = input.type === "number" || "number" in input.dataset;
        payload[input.name] = isNumber ? Number(input.value) : input.value;
    }

    const response = await fetch(endpoint, {
        method,
        headers: { "Content-Type": "application/json" },
        body: method === "DELETE" ? undefined : JSON.stringify(payload),
    });

    if (response.ok) {
        window.location.reload();
        return;
    }

    const body = await response.json().catch(() => ({}));
    let flash = form.querySelector(".flash-error");
    if (!flash) {
        flash = document.createElement("p");
        flash.className = "flash-error";
        form.prepend(flash);
    }
    flash.textContent = body.error || "Something went wrong, please try again.";
});
"#;

pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Khata" }
                style { (PreEscaped(STYLE)) }
                script { (PreEscaped(JSON_FORM_SCRIPT)) }
            }

            body
            {
                (content)
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        main
        {
            h1 { (header) }
            p { (description) }
            p { (fix) }
            a href="/" { "Back to Homepage" }
        }
    );

    base(title, &content)
}

/// A message shown above a form, e.g. after a failed log-in attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flash<'a> {
    Success(&'a str),
    Error(&'a str),
}

pub fn flash_message(flash: Option<Flash<'_>>) -> Markup {
    html! {
        @match flash {
            Some(Flash::Success(message)) => {
                p class="flash-success" { (message) }
            },
            Some(Flash::Error(message)) => {
                p class="flash-error" { (message) }
            },
            None => {},
        }
    }
}

pub fn log_in_register(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="card"
        {
            h1 { (form_title) }

            (form)
        }
    }
}

pub fn username_input(username: &str) -> Markup {
    html! {
        div
        {
            label for="username" { "Username" }

            input
                type="text"
                name="username"
                id="username"
                required
                autofocus
                value=(username);
        }
    }
}

pub fn password_input() -> Markup {
    html! {
        div
        {
            label for="password" { "Password" }

            input
                type="password"
                name="password"
                id="password"
                placeholder="••••••••"
                required;
        }
    }
}

/// A `select` for the transaction type with `selected` chosen, if given.
///
/// Types other than credit and debit are kept as an extra option so that
/// saving an edit does not change them.
pub fn transaction_type_select(id: Option<&str>, selected: Option<&str>) -> Markup {
    let other = selected.filter(|kind| !["credit", "debit"].contains(kind));

    html! {
        select name="type" id=[id] aria-label="Type" required
        {
            @for kind in ["credit", "debit"].into_iter().chain(other) {
                option value=(kind) selected[selected == Some(kind)] { (kind) }
            }
        }
    }
}

/// Format `amount` with two decimal places, e.g. "₹1234.50" or "-₹20.00".
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-₹{:.2}", amount.abs())
    } else {
        // abs() turns -0.0 into 0.0.
        format!("₹{:.2}", amount.abs())
    }
}
