//! Query form introspection
//!
//! The source's query page is a stateful postback form: two select
//! controls (program type and enrollment year), a submit button, and a
//! set of hidden state fields that must be echoed back verbatim.

use scraper::{Html, Selector};

/// Lists the option labels offered by a select control
///
/// # Returns
///
/// * `Some(labels)` - Option texts in document order
/// * `None` - The select control is absent
pub fn select_option_labels(html: &str, select_id: &str) -> Option<Vec<String>> {
    let document = Html::parse_document(html);

    let select = Selector::parse(&format!("select#{}", select_id)).ok()?;
    document.select(&select).next()?;

    let options = Selector::parse(&format!("select#{} option", select_id)).ok()?;
    Some(
        document
            .select(&options)
            .map(|o| o.text().collect::<String>().trim().to_string())
            .collect(),
    )
}

/// Resolves an option label to its submitted value
///
/// Options without a value attribute submit their label text.
pub fn select_option_value(html: &str, select_id: &str, label: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let options = Selector::parse(&format!("select#{} option", select_id)).ok()?;
    for option in document.select(&options) {
        let text = option.text().collect::<String>().trim().to_string();
        if text == label {
            return Some(
                option
                    .value()
                    .attr("value")
                    .map(str::to_string)
                    .unwrap_or(text),
            );
        }
    }
    None
}

/// Collects every hidden input as a (name, value) pair
///
/// These carry the form's server-side state and must be included in the
/// postback unchanged.
pub fn hidden_inputs(html: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse(r#"input[type="hidden"][name]"#) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|input| {
            let name = input.value().attr("name")?.to_string();
            let value = input.value().attr("value").unwrap_or("").to_string();
            Some((name, value))
        })
        .collect()
}

/// Reads the value attribute of an input by id (e.g., a submit button)
pub fn input_value(html: &str, input_id: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let selector = Selector::parse(&format!("input#{}", input_id)).ok()?;
    document
        .select(&selector)
        .next()
        .map(|input| input.value().attr("value").unwrap_or("").to_string())
}

/// Reads the form's action attribute, if one is declared
pub fn form_action(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let selector = Selector::parse("form[action]").ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|form| form.value().attr("action"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM_PAGE: &str = r#"
        <html><body><form action="query.aspx" method="post">
            <input type="hidden" name="__VIEWSTATE" value="abc123" />
            <input type="hidden" name="__EVENTVALIDATION" value="def456" />
            <select id="dpJhlx" name="dpJhlx">
                <option value="1" selected>First major</option>
                <option value="2">Second major</option>
            </select>
            <select id="dpRxnd" name="dpRxnd">
                <option>2016</option>
                <option>2017</option>
            </select>
            <input type="submit" id="btnQuery" name="btnQuery" value="Query" />
        </form></body></html>"#;

    #[test]
    fn test_select_option_labels() {
        let labels = select_option_labels(FORM_PAGE, "dpJhlx").unwrap();
        assert_eq!(labels, vec!["First major", "Second major"]);

        let years = select_option_labels(FORM_PAGE, "dpRxnd").unwrap();
        assert_eq!(years, vec!["2016", "2017"]);
    }

    #[test]
    fn test_select_option_labels_missing_control() {
        assert!(select_option_labels(FORM_PAGE, "dpMissing").is_none());
    }

    #[test]
    fn test_select_option_value_from_attr() {
        let value = select_option_value(FORM_PAGE, "dpJhlx", "Second major").unwrap();
        assert_eq!(value, "2");
    }

    #[test]
    fn test_select_option_value_falls_back_to_label() {
        let value = select_option_value(FORM_PAGE, "dpRxnd", "2017").unwrap();
        assert_eq!(value, "2017");
    }

    #[test]
    fn test_select_option_value_unknown_label() {
        assert!(select_option_value(FORM_PAGE, "dpRxnd", "1999").is_none());
    }

    #[test]
    fn test_input_value() {
        assert_eq!(input_value(FORM_PAGE, "btnQuery").unwrap(), "Query");
        assert!(input_value(FORM_PAGE, "btnMissing").is_none());
    }

    #[test]
    fn test_hidden_inputs() {
        let hidden = hidden_inputs(FORM_PAGE);
        assert_eq!(hidden.len(), 2);
        assert_eq!(hidden[0], ("__VIEWSTATE".to_string(), "abc123".to_string()));
    }

    #[test]
    fn test_form_action() {
        assert_eq!(form_action(FORM_PAGE).unwrap(), "query.aspx");
        assert!(form_action("<html><form></form></html>").is_none());
    }
}
