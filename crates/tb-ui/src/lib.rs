use askama::Template;

/// The login/welcome page served at `/form`. Renders the welcome
/// branch when a verified session supplied a display name, and the
/// login form otherwise.
#[derive(Template)]
#[template(path = "form.html")]
pub struct FormTemplate {
    pub nickname: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_branch_contains_display_name() {
        let html = FormTemplate {
            nickname: Some("User One".to_string()),
        }
        .render()
        .unwrap();
        assert!(html.contains("Welcome back, User One!"));
        assert!(html.contains("/logout"));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn anonymous_branch_renders_login_form() {
        let html = FormTemplate { nickname: None }.render().unwrap();
        assert!(html.contains("<h1>Login</h1>"));
        assert!(html.contains("action=\"/login\""));
    }
}
