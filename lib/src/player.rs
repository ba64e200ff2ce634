use crate::{error::Error, Day, PlayerId, Result};
use parse_display::{Display, FromStr};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display)]
#[display("{name}: {level}")]
pub struct Player {
    pub id: PlayerId,
    #[serde(default = "default_active")]
    pub active: bool,
    pub name: String,
    pub initials: String,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub level: u32,
    #[serde(default)]
    pub title: Option<String>,
    pub join: Day,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave: Option<Day>,
    #[serde(default)]
    pub warn: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: String, initials: String, level: u32, join: Day) -> Self {
        Self {
            id,
            active: true,
            name,
            initials,
            level,
            title: None,
            join,
            leave: None,
            warn: 0,
        }
    }

    /// Joined strictly before `day` and had not left before it.
    pub fn is_eligible_on(&self, day: Day) -> bool {
        self.join < day && self.leave.map_or(true, |leave| leave >= day)
    }
}

fn default_active() -> bool {
    true
}

// Older stores recorded the level exactly as typed at the prompt, i.e. as a string.
fn number_or_numeric_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(level) => Ok(level),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// The player fields an edit is allowed to touch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, FromStr)]
#[display(style = "snake_case")]
pub enum Field {
    Name,
    Initials,
    Level,
    Title,
    Join,
    Warn,
    Active,
}

impl Field {
    pub const NAMES: [&'static str; 7] = ["name", "initials", "level", "title", "join", "warn", "active"];
}

/// A partial update to a [`Player`].
///
/// Only the fields enumerated here can change; `id` and `leave` are owned by
/// the registry. Unknown keys are refused while the patch is being built, both
/// from `key=value` pairs and from JSON.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub initials: Option<String>,
    pub level: Option<u32>,
    /// `Some(None)` clears the title.
    #[serde(default, deserialize_with = "present_or_null")]
    pub title: Option<Option<String>>,
    pub join: Option<Day>,
    pub warn: Option<u32>,
    pub active: Option<bool>,
}

fn present_or_null<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Option<String>>, D::Error> {
    Option::<String>::deserialize(deserializer).map(Some)
}

impl PlayerPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a patch from `key=value` words, e.g. `level=3 title=captain`.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patch = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (pair, None),
            };
            let field = key
                .trim()
                .parse::<Field>()
                .map_err(|_| Error::UnknownField(key.trim().to_string()))?;
            // a bare field name is a typo, not a request to blank the field
            let value = value.ok_or_else(|| Error::InvalidField {
                field,
                value: pair.to_string(),
            })?;
            patch.set(field, value)?;
        }
        Ok(patch)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn set(&mut self, field: Field, value: &str) -> Result<()> {
        let invalid = || Error::InvalidField {
            field,
            value: value.to_string(),
        };
        let value = value.trim();
        match field {
            Field::Name => self.name = Some(value.to_string()),
            Field::Initials => self.initials = Some(value.to_string()),
            Field::Level => self.level = Some(value.parse().map_err(|_| invalid())?),
            Field::Title => {
                self.title = match value {
                    "" | "null" => Some(None),
                    title => Some(Some(title.to_string())),
                }
            }
            Field::Join => self.join = Some(value.parse().map_err(|_| invalid())?),
            Field::Warn => self.warn = Some(value.parse().map_err(|_| invalid())?),
            Field::Active => self.active = Some(value.parse().map_err(|_| invalid())?),
        }
        Ok(())
    }

    pub fn apply(&self, player: &mut Player) {
        if let Some(name) = &self.name {
            player.name = name.clone();
        }
        if let Some(initials) = &self.initials {
            player.initials = initials.clone();
        }
        if let Some(level) = self.level {
            player.level = level;
        }
        if let Some(title) = &self.title {
            player.title = title.clone();
        }
        if let Some(join) = self.join {
            player.join = join;
        }
        if let Some(warn) = self.warn {
            player.warn = warn;
        }
        if let Some(active) = self.active {
            player.active = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(1, "Zhang Wei".to_string(), "zw".to_string(), 3, 100)
    }

    #[test]
    fn displays_name_and_level() {
        assert_eq!(player().to_string(), "Zhang Wei: 3");
    }

    #[test]
    fn eligibility_window() {
        let mut p = player();
        assert!(!p.is_eligible_on(100), "not eligible on the join day itself");
        assert!(p.is_eligible_on(101));
        p.leave = Some(105);
        assert!(p.is_eligible_on(105));
        assert!(!p.is_eligible_on(106));
    }

    #[test]
    fn pairs_patch_only_touches_named_fields() {
        let patch = PlayerPatch::from_pairs(["level=5", "title=captain"]).unwrap();
        let mut p = player();
        patch.apply(&mut p);
        assert_eq!(p.level, 5);
        assert_eq!(p.title.as_deref(), Some("captain"));
        assert_eq!(p.name, "Zhang Wei");
        assert_eq!(p.join, 100);
    }

    #[test]
    fn empty_title_clears_it() {
        let mut p = player();
        p.title = Some("captain".to_string());
        PlayerPatch::from_pairs(["title="]).unwrap().apply(&mut p);
        assert_eq!(p.title, None);
    }

    #[test]
    fn unknown_fields_are_rejected_up_front() {
        let err = PlayerPatch::from_pairs(["level=2", "id=9"]).unwrap_err();
        assert!(matches!(err, Error::UnknownField(ref key) if key == "id"));

        assert!(matches!(PlayerPatch::from_pairs(["leave=3"]), Err(Error::UnknownField(_))));
        assert!(PlayerPatch::from_json(r#"{"level": 2, "leave": 3}"#).is_err());
    }

    #[test]
    fn field_without_value_is_rejected() {
        let err = PlayerPatch::from_pairs(["title"]).unwrap_err();
        assert!(matches!(err, Error::InvalidField { field: Field::Title, ref value } if value == "title"));
        assert!(matches!(
            PlayerPatch::from_pairs(["level=2", "name"]),
            Err(Error::InvalidField { field: Field::Name, .. })
        ));
        assert!(matches!(PlayerPatch::from_pairs(["colour"]), Err(Error::UnknownField(_))));
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = PlayerPatch::from_pairs(["warn=-1"]).unwrap_err();
        assert!(matches!(err, Error::InvalidField { field: Field::Warn, .. }));
        assert!(PlayerPatch::from_pairs(["active=maybe"]).is_err());
    }

    #[test]
    fn json_patch_distinguishes_null_title_from_missing() {
        let clear = PlayerPatch::from_json(r#"{"title": null}"#).unwrap();
        assert_eq!(clear.title, Some(None));
        let untouched = PlayerPatch::from_json(r#"{"level": 4}"#).unwrap();
        assert_eq!(untouched.title, None);
        assert_eq!(untouched.level, Some(4));
    }

    #[test]
    fn field_names_round_trip_through_from_str() {
        for name in Field::NAMES {
            assert_eq!(name.parse::<Field>().unwrap().to_string(), name);
        }
    }

    #[test]
    fn reads_legacy_string_levels() {
        let json = r#"{"id":7,"active":true,"name":"Li Lei","initials":"ll","level":"12","title":null,"join":16401,"warn":0}"#;
        let p: Player = serde_json::from_str(json).unwrap();
        assert_eq!(p.level, 12);
        assert_eq!(p.leave, None);
    }

    #[test]
    fn leave_is_omitted_until_set() {
        let json = serde_json::to_value(player()).unwrap();
        assert!(json.get("leave").is_none());
        assert!(json["title"].is_null());
    }
}
