#![allow(missing_docs)]

mod form;
mod response;

pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_submit_button,
    assert_form_success_message, must_get_form, must_get_json_form,
};
pub(crate) use response::{assert_valid_html, get_header, parse_html_document};
