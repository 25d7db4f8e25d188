use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

/// Get the form that sends its fields to the JSON `endpoint`.
#[track_caller]
pub(crate) fn must_get_json_form<'a>(html: &'a Html, endpoint: &str) -> ElementRef<'a> {
    let selector = Selector::parse(&format!("form[data-endpoint='{endpoint}']")).unwrap();

    html.select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No form found for endpoint \"{endpoint}\""))
}

/// Assert that `form` has a required input named `name` of type `type_`.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let selector = Selector::parse(&format!("input[name='{name}']")).unwrap();
    let input = form
        .select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No input found with name \"{name}\""));

    let input_type = input.value().attr("type").unwrap_or_default();
    assert_eq!(
        input_type, type_,
        "want input {name} with type \"{type_}\", got {input_type:?}"
    );
    assert!(
        input.value().attr("required").is_some(),
        "want input with name {name} to have the required attribute but got none"
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let submit_button = form
        .select(&Selector::parse("button").unwrap())
        .next()
        .expect("No button found");

    assert_eq!(
        submit_button.value().attr("type").unwrap_or_default(),
        "submit",
        "want submit button with type=\"submit\""
    );
}

/// Assert that the page shows the flash error `want_message`.
#[track_caller]
pub(crate) fn assert_form_error_message(html: &ElementRef<'_>, want_message: &str) {
    assert_flash(html, "flash-error", want_message);
}

/// Assert that the page shows the flash success message `want_message`.
#[track_caller]
pub(crate) fn assert_form_success_message(html: &ElementRef<'_>, want_message: &str) {
    assert_flash(html, "flash-success", want_message);
}

#[track_caller]
fn assert_flash(html: &ElementRef<'_>, class: &str, want_message: &str) {
    let selector = Selector::parse(&format!("p.{class}")).unwrap();
    let got_message = html
        .select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No {class} message found"))
        .text()
        .collect::<String>();

    assert_eq!(want_message, got_message.trim());
}
