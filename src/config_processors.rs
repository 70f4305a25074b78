use justconfig::error::ConfigError;
use justconfig::item::{MapAction, StringItem};

/// Remove quotes from configuration strings.
pub trait Unquote
where
    Self: Sized,
{
    fn unquote(self) -> Result<StringItem, ConfigError>;
}

impl Unquote for Result<StringItem, ConfigError> {
    /// Trims every value and strips one pair of matching `"` or `'` quotes.
    ///
    /// Unquoted values are kept as they are, so paths and metric names can be
    /// written either way in the configuration file.
    ///
    /// ## Example
    ///
    /// ```rust
    /// # use justconfig::Config;
    /// # use justconfig::ConfPath;
    /// # use justconfig::item::ValueExtractor;
    /// # use justconfig::sources::defaults::Defaults;
    /// # use collabrec::config_processors::Unquote;
    /// #
    /// # let mut conf = Config::default();
    /// # let mut defaults = Defaults::default();
    /// defaults.set(conf.root().push_all(&["metric"]), "'pearson'", "source info");
    /// conf.add_source(defaults);
    ///
    /// let value: String = conf.get(ConfPath::from(&["metric"])).unquote().value().unwrap();
    ///
    /// assert_eq!(value, "pearson");
    /// ```
    fn unquote(self) -> Result<StringItem, ConfigError> {
        self?.map(|v| match strip_quotes(v) {
            Some(stripped) => MapAction::Replace(vec![stripped.to_owned()]),
            None => MapAction::Keep,
        })
    }
}

fn strip_quotes(value: &str) -> Option<&str> {
    let value = value.trim();
    ['"', '\''].iter().find_map(|quote| {
        if value.len() >= 2 && value.starts_with(*quote) && value.ends_with(*quote) {
            Some(&value[1..value.len() - 1])
        } else {
            None
        }
    })
}
