use serde::Serialize;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait TemplateService: Send + Sync + 'static {
    /// Render the plain text and html variants of the given template.
    fn render<T: Template + 'static>(&self, template: &T) -> anyhow::Result<RenderedTemplate>;
}

#[cfg(feature = "mock")]
impl MockTemplateService {
    pub fn with_render<T: Template + Send + PartialEq + std::fmt::Debug + 'static>(
        mut self,
        template: T,
        result: RenderedTemplate,
    ) -> Self {
        self.expect_render()
            .once()
            .with(mockall::predicate::eq(template))
            .return_once(|_| Ok(result));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    pub text: String,
    pub html: String,
}

/// A fixed email layout.
///
/// Values are substituted as they are. The text variant reads the plain
/// fields, the html variant reads the `*_html` fields, which must already be
/// escaped.
pub trait Template: Serialize {
    const NAME: &'static str;
    const TEXT: &'static str;
    const HTML: &'static str;
}

pub const BASE_TEMPLATE: &str = include_str!("../templates/base.html");

macro_rules! templates {
    ($( $ident:ident ( $path:literal ), )* ) => {
        $(
            impl Template for $ident {
                const NAME: &'static str = stringify!($ident);
                const TEXT: &'static str = include_str!(concat!("../templates/", $path, ".txt"));
                const HTML: &'static str = include_str!(concat!("../templates/", $path, ".html"));
            }
        )*

        /// `(name, text, html)` of every known template.
        pub const TEMPLATES: &[(&str, &str, &str)] = &[
            $( ($ident::NAME, $ident::TEXT, $ident::HTML) ),*
        ];
    };
}

templates! {
    ContactNotificationTemplate("contact_notification"),
    ContactAutoReplyTemplate("contact_auto_reply"),
    TestEmailTemplate("test_email"),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactNotificationTemplate {
    pub name: String,
    pub name_html: String,
    pub email: String,
    pub email_html: String,
    pub subject: String,
    pub subject_html: String,
    pub message: String,
    /// Escaped `message` with line breaks turned into `<br>` tags.
    pub message_html: String,
    pub submitted_at: String,
    pub client_ip: String,
    pub user_agent: String,
    pub user_agent_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactAutoReplyTemplate {
    pub name: String,
    pub name_html: String,
    pub subject: String,
    pub subject_html: String,
    pub preview: String,
    pub preview_html: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestEmailTemplate {
    pub sent_at: String,
}
