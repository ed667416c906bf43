use chrono::{DateTime, SecondsFormat, Utc};
use rocket::serde::{Deserialize, Serialize};
use serde::de::{self, IgnoredAny, MapAccess, Visitor};

// Types allowed in the database:
// i64
// f64
// bool
// &'r str
// String
// (timestamps travel as RFC 3339 text)

pub type GameScore = i64;

/// One persisted (name, score, timestamp) tuple.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ScoreRecord {
    #[serde(rename = "userName")]
    pub user_name: String,
    pub score: GameScore,
    #[serde(rename = "timeStamp")]
    pub timestamp: DateTime<Utc>,
}

impl ScoreRecord {
    /// Stamps a submission with the current time. The timestamp is assigned
    /// here, at the moment the record enters the system; clients cannot
    /// supply one.
    pub fn new(submission: ScoreSubmission) -> Self {
        Self {
            user_name: submission.user_name,
            score: submission.score,
            timestamp: Utc::now(),
        }
    }

    /// Timestamp encoding used in the `timestamp` column. The format is
    /// fixed-width UTC so that lexicographic comparison in SQL matches
    /// chronological order.
    pub fn timestamp_column(&self) -> String {
        encode_timestamp(&self.timestamp)
    }
}

pub fn encode_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|parsed| parsed.with_timezone(&Utc))
}

/// An inbound score submission, before the server assigns its timestamp.
#[derive(Clone, PartialEq, Debug)]
pub struct ScoreSubmission {
    pub user_name: String,
    pub score: GameScore,
}

// Hand-written so that field names bind case-insensitively ("userName",
// "username", "USERNAME" are all accepted) and so that unknown keys,
// including any client-supplied timestamp, are dropped.
impl<'de> serde::Deserialize<'de> for ScoreSubmission {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SubmissionVisitor;

        impl<'de> Visitor<'de> for SubmissionVisitor {
            type Value = ScoreSubmission;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("an object with userName and score fields")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut user_name: Option<String> = None;
                let mut score: Option<GameScore> = None;

                while let Some(key) = map.next_key::<String>()? {
                    if key.eq_ignore_ascii_case("username") {
                        if user_name.is_some() {
                            return Err(de::Error::duplicate_field("userName"));
                        }
                        user_name = Some(map.next_value()?);
                    } else if key.eq_ignore_ascii_case("score") {
                        if score.is_some() {
                            return Err(de::Error::duplicate_field("score"));
                        }
                        score = Some(map.next_value()?);
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }

                Ok(ScoreSubmission {
                    user_name: user_name.ok_or_else(|| de::Error::missing_field("userName"))?,
                    score: score.ok_or_else(|| de::Error::missing_field("score"))?,
                })
            }
        }

        deserializer.deserialize_map(SubmissionVisitor)
    }
}
