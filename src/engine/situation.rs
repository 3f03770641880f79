//! The game situation a decision is evaluated in.
//!
//! Callers describe field position the way a sideline does ("own 40",
//! "opponent 30"); everything downstream works in `yardline_100`, the number
//! of yards between the ball and the opponent's goal line.

use serde::Serialize;
use std::str::FromStr;

use super::error::EngineError;

/// Which half of the field the coach yardline refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Own,
    Opponent,
}

impl FromStr for Side {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "own" => Ok(Side::Own),
            "opponent" => Ok(Side::Opponent),
            _ => Err(EngineError::InvalidSide(s.to_string())),
        }
    }
}

/// Convert a coach yardline (1–50) plus side into `yardline_100`.
///
/// `own` maps onto [50, 99], `opponent` onto [1, 50].
pub fn convert_to_yardline_100(yardline: i64, side: Side) -> Result<u32, EngineError> {
    if !(1..=50).contains(&yardline) {
        return Err(EngineError::InvalidYardline(yardline));
    }
    let yardline = yardline as u32;
    Ok(match side {
        Side::Own => 100 - yardline,
        Side::Opponent => yardline,
    })
}

/// Length of a quarter in seconds.
pub const QUARTER_SECONDS: u32 = 900;

/// Parse a game clock of the form `MM:SS` or a bare number of seconds.
/// Anything unparseable counts as 0 seconds remaining; anything longer than a
/// quarter counts as a full quarter.
pub fn parse_clock(clock: &str) -> u32 {
    let clock = clock.trim();
    let parsed = match clock.split_once(':') {
        Some((minutes, seconds)) => minutes
            .trim()
            .parse::<u32>()
            .ok()
            .zip(seconds.trim().parse::<u32>().ok())
            .and_then(|(m, s)| m.checked_mul(60)?.checked_add(s)),
        None => clock.parse::<u32>().ok(),
    };
    parsed.unwrap_or(0).min(QUARTER_SECONDS)
}

/// Parse a quarter given as `1st`..`4th` or a bare digit.
pub fn parse_quarter(quarter: &str) -> Result<u8, EngineError> {
    match quarter.trim().to_lowercase().as_str() {
        "1" | "1st" => Ok(1),
        "2" | "2nd" => Ok(2),
        "3" | "3rd" => Ok(3),
        "4" | "4th" => Ok(4),
        _ => Err(EngineError::InvalidQuarter(quarter.to_string())),
    }
}

/// The caller-facing description of a fourth-down situation, before
/// normalisation.
#[derive(Debug, Clone)]
pub struct SituationInput {
    pub yardline: i64,
    pub side: String,
    pub distance_to_gain: i64,
    pub quarter: String,
    pub clock: String,
    pub score_differential: i32,
    pub kicker_range_yards: u32,
    pub punter_range_yards: u32,
}

/// Quarter, clock and score: the inputs the situational adjustments key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameTiming {
    pub quarter: u8,
    pub clock_seconds_remaining: u32,
    pub score_differential: i32,
}

impl GameTiming {
    pub fn is_late_fourth(&self) -> bool {
        self.quarter == 4 && self.clock_seconds_remaining < 300
    }
}

/// Normalised, immutable situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SituationDescriptor {
    yardline_100: u32,
    distance_to_gain: u32,
    quarter: u8,
    clock_seconds_remaining: u32,
    score_differential: i32,
    kicker_range_yards: u32,
    punter_range_yards: u32,
}

impl SituationDescriptor {
    pub fn from_input(input: &SituationInput) -> Result<Self, EngineError> {
        let side: Side = input.side.parse()?;
        let yardline_100 = convert_to_yardline_100(input.yardline, side)?;
        if input.distance_to_gain < 1 {
            return Err(EngineError::InvalidDistance(input.distance_to_gain));
        }
        let quarter = parse_quarter(&input.quarter)?;

        Ok(SituationDescriptor {
            yardline_100,
            distance_to_gain: u32::try_from(input.distance_to_gain).unwrap_or(u32::MAX),
            quarter,
            clock_seconds_remaining: parse_clock(&input.clock),
            score_differential: input.score_differential,
            kicker_range_yards: input.kicker_range_yards,
            punter_range_yards: input.punter_range_yards,
        })
    }

    pub fn yardline_100(&self) -> u32 {
        self.yardline_100
    }

    pub fn distance_to_gain(&self) -> u32 {
        self.distance_to_gain
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    pub fn clock_seconds_remaining(&self) -> u32 {
        self.clock_seconds_remaining
    }

    pub fn score_differential(&self) -> i32 {
        self.score_differential
    }

    pub fn kicker_range_yards(&self) -> u32 {
        self.kicker_range_yards
    }

    pub fn punter_range_yards(&self) -> u32 {
        self.punter_range_yards
    }

    pub fn timing(&self) -> GameTiming {
        GameTiming {
            quarter: self.quarter,
            clock_seconds_remaining: self.clock_seconds_remaining,
            score_differential: self.score_differential,
        }
    }

    /// Seconds left in the current half (quarters 1 and 3 still have a full
    /// quarter to play after this one).
    pub fn half_seconds_remaining(&self) -> u32 {
        match self.quarter {
            1 | 3 => self.clock_seconds_remaining.saturating_add(QUARTER_SECONDS),
            _ => self.clock_seconds_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(yardline: i64, side: &str) -> SituationInput {
        SituationInput {
            yardline,
            side: side.into(),
            distance_to_gain: 4,
            quarter: "4th".into(),
            clock: "8:00".into(),
            score_differential: 0,
            kicker_range_yards: 50,
            punter_range_yards: 45,
        }
    }

    #[test]
    fn own_side_is_a_bijection_onto_50_99() {
        let mut seen: Vec<u32> = (1..=50)
            .map(|y| convert_to_yardline_100(y, Side::Own).unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (50..=99).collect::<Vec<_>>());
    }

    #[test]
    fn opponent_side_is_a_bijection_onto_1_50() {
        let seen: Vec<u32> = (1..=50)
            .map(|y| convert_to_yardline_100(y, Side::Opponent).unwrap())
            .collect();
        assert_eq!(seen, (1..=50).collect::<Vec<_>>());
    }

    #[test]
    fn out_of_range_yardline_rejects() {
        for y in [-5, 0, 51, 99] {
            for side in [Side::Own, Side::Opponent] {
                assert_eq!(
                    convert_to_yardline_100(y, side),
                    Err(EngineError::InvalidYardline(y))
                );
            }
        }
    }

    #[test]
    fn side_parsing_is_case_insensitive_and_strict() {
        assert_eq!("OWN".parse::<Side>(), Ok(Side::Own));
        assert_eq!(" Opponent ".parse::<Side>(), Ok(Side::Opponent));
        assert!(matches!("home".parse::<Side>(), Err(EngineError::InvalidSide(_))));
        assert!(matches!("".parse::<Side>(), Err(EngineError::InvalidSide(_))));
    }

    #[test]
    fn clock_parsing() {
        assert_eq!(parse_clock("4:00"), 240);
        assert_eq!(parse_clock("12:34"), 754);
        assert_eq!(parse_clock("0:07"), 7);
        assert_eq!(parse_clock("95"), 95);
        assert_eq!(parse_clock("abc"), 0);
        assert_eq!(parse_clock("4:xx"), 0);
        assert_eq!(parse_clock("-30"), 0);
        assert_eq!(parse_clock(""), 0);
    }

    #[test]
    fn clock_is_capped_at_a_quarter() {
        assert_eq!(parse_clock("15:00"), 900);
        assert_eq!(parse_clock("16:00"), 900);
        assert_eq!(parse_clock("4294967295"), 900);
        assert_eq!(parse_clock("71582789:59"), 900);
    }

    #[test]
    fn huge_first_quarter_clock_gives_full_half() {
        let mut i = input(40, "own");
        i.quarter = "1st".into();
        i.clock = "4294967295".into();
        let s = SituationDescriptor::from_input(&i).unwrap();
        assert_eq!(s.clock_seconds_remaining(), 900);
        assert_eq!(s.half_seconds_remaining(), 1800);
    }

    #[test]
    fn distance_beyond_u32_saturates_instead_of_wrapping() {
        let mut i = input(40, "own");
        i.distance_to_gain = 4_294_967_297;
        let s = SituationDescriptor::from_input(&i).unwrap();
        assert_eq!(s.distance_to_gain(), u32::MAX);
    }

    #[test]
    fn quarter_labels() {
        assert_eq!(parse_quarter("1st"), Ok(1));
        assert_eq!(parse_quarter("2ND"), Ok(2));
        assert_eq!(parse_quarter("3"), Ok(3));
        assert_eq!(parse_quarter("4th"), Ok(4));
        assert!(parse_quarter("OT").is_err());
        assert!(parse_quarter("5").is_err());
    }

    #[test]
    fn descriptor_from_input() {
        let s = SituationDescriptor::from_input(&input(40, "own")).unwrap();
        assert_eq!(s.yardline_100(), 60);
        assert_eq!(s.distance_to_gain(), 4);
        assert_eq!(s.quarter(), 4);
        assert_eq!(s.clock_seconds_remaining(), 480);
        assert_eq!(s.half_seconds_remaining(), 480);
    }

    #[test]
    fn descriptor_rejects_bad_inputs() {
        assert!(matches!(
            SituationDescriptor::from_input(&input(40, "midfield")),
            Err(EngineError::InvalidSide(_))
        ));
        assert!(matches!(
            SituationDescriptor::from_input(&input(55, "own")),
            Err(EngineError::InvalidYardline(55))
        ));
        let mut zero_to_go = input(40, "own");
        zero_to_go.distance_to_gain = 0;
        assert_eq!(
            SituationDescriptor::from_input(&zero_to_go),
            Err(EngineError::InvalidDistance(0))
        );
    }

    #[test]
    fn half_seconds_in_first_and_third_quarters() {
        let mut i = input(30, "opponent");
        i.quarter = "3rd".into();
        i.clock = "5:00".into();
        let s = SituationDescriptor::from_input(&i).unwrap();
        assert_eq!(s.half_seconds_remaining(), 1200);
    }
}
