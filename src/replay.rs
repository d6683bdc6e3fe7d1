use crate::error::Result;
use crate::location::Location;
use serde_json::{json, Value};
use std::{collections::HashMap, fs::File, io::BufWriter};

pub fn create_replay_logger(filename: Option<String>, board_size: usize) -> Box<dyn ReplayLogger> {
    match filename {
        None => Box::new(NoOpReplayLogger {}),
        Some(filename) => Box::new(JsonReplayLogger::new(filename, board_size)),
    }
}

pub trait ReplayLogger {
    #[allow(unused_variables)]
    fn log_round(&mut self, round: usize, bears: usize, honey: usize) {}

    #[allow(unused_variables)]
    fn log_end_game(&mut self, reason: String) {}

    #[allow(unused_variables)]
    fn log_event(&mut self, round: usize, event: Event) {}

    fn save(&self) -> Result<()> {
        Ok(())
    }

    fn log_spawn_bear(&mut self, round: usize, id: String, location: Location) {
        self.log_event(
            round,
            Event::new(EventType::Spawn, "Bear", Some(id), location),
        );
    }

    fn log_spawn_food(&mut self, round: usize, name: &str, location: Location) {
        self.log_event(round, Event::new(EventType::Spawn, name, None, location));
    }

    fn log_move_bear(&mut self, round: usize, id: String, location: Location, destination: Location) {
        self.log_event(
            round,
            Event::new(EventType::Move, "Bear", Some(id), location).with_destination(destination),
        );
    }

    fn log_eat(&mut self, round: usize, id: String, food: &str, location: Location) {
        self.log_event(
            round,
            Event::new(EventType::Eat, "Bear", Some(id), location).with_target(food.to_string()),
        );
    }

    fn log_fight(
        &mut self,
        round: usize,
        winner: String,
        loser: String,
        location: Location,
        points: i32,
    ) {
        self.log_event(
            round,
            Event::new(EventType::Fight, "Bear", Some(winner), location)
                .with_target(loser)
                .with_points(points),
        );
    }

    fn log_avoid(
        &mut self,
        round: usize,
        avoider: String,
        other: String,
        location: Location,
        points: i32,
    ) {
        self.log_event(
            round,
            Event::new(EventType::Avoid, "Bear", Some(avoider), location)
                .with_target(other)
                .with_points(points),
        );
    }

    fn log_relocate(&mut self, round: usize, id: String, location: Location, destination: Location) {
        self.log_event(
            round,
            Event::new(EventType::Relocate, "Bear", Some(id), location)
                .with_destination(destination),
        );
    }

    fn log_death(&mut self, round: usize, id: String, location: Location) {
        self.log_event(
            round,
            Event::new(EventType::Death, "Bear", Some(id), location),
        );
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub enum EventType {
    Spawn,
    Move,
    Eat,
    Fight,
    Avoid,
    Relocate,
    Death,
}

/// Something that happened on the board.
///
/// `target` names the other party: the loser of a fight, the bear that was run away from, or the
/// food that was eaten. `points` is the amount of life points that changed hands.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Event {
    event_type: EventType,
    entity: String,
    id: Option<String>,
    location: Location,
    destination: Option<Location>,
    target: Option<String>,
    points: Option<i32>,
}

impl Event {
    fn new(event_type: EventType, entity: &str, id: Option<String>, location: Location) -> Event {
        Event {
            event_type,
            entity: entity.to_string(),
            id,
            location,
            destination: None,
            target: None,
            points: None,
        }
    }

    fn with_destination(mut self, destination: Location) -> Event {
        self.destination = Some(destination);
        self
    }

    fn with_target(mut self, target: String) -> Event {
        self.target = Some(target);
        self
    }

    fn with_points(mut self, points: i32) -> Event {
        self.points = Some(points);
        self
    }
}

struct Round {
    round: usize,
    bears: usize,
    honey: usize,
}

struct NoOpReplayLogger;
impl ReplayLogger for NoOpReplayLogger {}

pub struct JsonReplayLogger {
    filename: String,
    board_size: usize,
    rounds: Vec<Round>,
    events: HashMap<usize, Vec<Event>>,
    finished_reason: Option<String>,
}

impl JsonReplayLogger {
    pub fn new(filename: String, board_size: usize) -> JsonReplayLogger {
        JsonReplayLogger {
            filename,
            board_size,
            rounds: Vec::new(),
            events: HashMap::new(),
            finished_reason: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let rounds: Vec<_> = self
            .rounds
            .iter()
            .map(|round| {
                json!({
                    "round": round.round,
                    "bears": round.bears,
                    "honey": round.honey,
                    "events": self.events.get(&round.round).unwrap_or(&Vec::new()),
                })
            })
            .collect();

        json!({
            "board": {
                "size": self.board_size,
            },
            "rounds": rounds,
            "finished_reason": self.finished_reason,
        })
    }
}

impl ReplayLogger for JsonReplayLogger {
    fn log_round(&mut self, round: usize, bears: usize, honey: usize) {
        self.rounds.push(Round {
            round,
            bears,
            honey,
        });
    }

    fn log_end_game(&mut self, reason: String) {
        self.finished_reason = Some(reason);
    }

    fn log_event(&mut self, round: usize, event: Event) {
        self.events.entry(round).or_default().push(event);
    }

    fn save(&self) -> Result<()> {
        let file = File::create(&self.filename)?;
        let mut writer = BufWriter::new(&file);
        serde_json::to_writer_pretty(&mut writer, &self.to_json())?;
        Ok(())
    }
}
