use crate::error::{BoardError, BoardResult};
use scraper::{Html, Selector};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeElement {
    pub title_text: String,
}

/// Locates badge containers in a profile page.
#[derive(Debug, Clone)]
pub struct BadgeMarkup {
    badge: Selector,
    title: Selector,
}

impl BadgeMarkup {
    pub fn new(badge_selector: &str, title_selector: &str) -> BoardResult<Self> {
        Ok(BadgeMarkup {
            badge: parse_selector(badge_selector)?,
            title: parse_selector(title_selector)?,
        })
    }

    /// Title text of every badge container in the document. Containers without a
    /// title element yield an empty title.
    pub fn find_badge_elements(&self, html: &str) -> Vec<BadgeElement> {
        let document = Html::parse_document(html);
        document
            .select(&self.badge)
            .map(|badge| BadgeElement {
                title_text: badge
                    .select(&self.title)
                    .flat_map(|title| title.text())
                    .collect::<String>(),
            })
            .collect()
    }
}

fn parse_selector(selector: &str) -> BoardResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| BoardError::Configuration(format!("Invalid selector '{selector}'. {e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markup() -> BadgeMarkup {
        BadgeMarkup::new("div.profile-badge", "span.ql-title-medium").unwrap()
    }

    #[test]
    fn titles_are_read_from_each_badge() {
        let html = r#"
            <html><body>
              <div class="profile-badge"><span class="ql-title-medium">Build a <b>Secure</b> Network</span></div>
              <div class="profile-badge"><span class="other">no title here</span></div>
              <div class="not-a-badge"><span class="ql-title-medium">ignored</span></div>
            </body></html>"#;
        let titles: Vec<String> = markup()
            .find_badge_elements(html)
            .into_iter()
            .map(|b| b.title_text)
            .collect();
        assert_eq!(titles, vec!["Build a Secure Network".to_string(), String::new()]);
    }

    #[test]
    fn garbage_markup_yields_nothing() {
        assert!(markup().find_badge_elements("<<<not html").is_empty());
        assert!(markup().find_badge_elements("").is_empty());
    }

    #[test]
    fn invalid_selector_is_a_configuration_error() {
        let err = BadgeMarkup::new("div..[", "span").unwrap_err();
        assert!(matches!(err, BoardError::Configuration(_)));
    }
}
