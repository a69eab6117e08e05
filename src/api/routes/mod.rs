pub mod fixtures;
pub mod health;
pub mod players;
pub mod refresh;
pub mod teams;

use std::str::FromStr;

use crate::api::ApiError;
use crate::models::parse_id_list;

/// Parse a comma-separated query value such as `teams=1,4,12`.
pub(crate) fn parse_list<T: FromStr>(name: &str, raw: Option<&str>) -> Result<Vec<T>, ApiError> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) => parse_id_list(raw)
            .map_err(|bad| ApiError::BadRequest(format!("invalid {} value '{}'", name, bad))),
    }
}

/// Parse an optional single query value.
pub(crate) fn parse_opt<T>(name: &str, raw: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.parse::<T>()
                .map_err(|e| ApiError::BadRequest(format!("invalid {}: {}", name, e)))
        })
        .transpose()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Position, TeamId};

    #[test]
    fn test_parse_list() {
        let ids: Vec<TeamId> = parse_list("teams", Some("1, 4,12")).unwrap();
        assert_eq!(ids, vec![TeamId::new(1), TeamId::new(4), TeamId::new(12)]);

        let none: Vec<TeamId> = parse_list("teams", None).unwrap();
        assert!(none.is_empty());

        let err = parse_list::<TeamId>("teams", Some("1,x")).unwrap_err();
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn test_parse_opt() {
        let pos: Option<Position> = parse_opt("position", Some("fwd")).unwrap();
        assert_eq!(pos, Some(Position::Forward));

        let blank: Option<Position> = parse_opt("position", Some("")).unwrap();
        assert_eq!(blank, None);

        assert!(parse_opt::<Position>("position", Some("striker")).is_err());
    }
}
