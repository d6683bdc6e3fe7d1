use crate::error::{BearHuntError, Result};
use crate::location::{Direction, Location};
use crossterm::style::Color;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::Serialize;
use std::any::type_name;
use std::fmt;
use uuid::Uuid;

/// Upper bound for a bear's life points. Bears start with exactly this many.
pub const MAX_LIFE_POINTS: i32 = 100;

// Flat cost of taking a turn
const TURN_LIFE_POINTS: i32 = 1;
const FIGHT_AVOIDANCE_PERCENT: i32 = 10;
// Standard deviation of the noise added to every inherited trait
const INHERITANCE_NOISE: f64 = 0.01;

pub trait Entity {
    fn name(&self) -> &str {
        type_name::<Self>().rsplit("::").next().unwrap_or("Entity")
    }

    fn id(&self) -> &str {
        "Entity"
    }

    fn location(&self) -> Location;

    fn char(&self) -> char;

    fn color(&self) -> Color {
        Color::White
    }
}

/// The heritable traits of a bear. Each one is the probability of a particular decision.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum TraitKind {
    /// Probability of moving on a turn.
    Activity,
    /// Probability of eating honey the bear walks into.
    Smell,
    /// Probability of picking a fight.
    Impulsiveness,
    /// Probability of running away from a fight.
    Cowardice,
}

impl TraitKind {
    pub const ALL: [TraitKind; 4] = [
        TraitKind::Activity,
        TraitKind::Smell,
        TraitKind::Impulsiveness,
        TraitKind::Cowardice,
    ];
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraitKind::Activity => "activity",
            TraitKind::Smell => "smell",
            TraitKind::Impulsiveness => "impulsiveness",
            TraitKind::Cowardice => "cowardice",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Traits {
    activity: f64,
    smell: f64,
    impulsiveness: f64,
    cowardice: f64,
}

impl Traits {
    /// Creates a set of traits, rejecting any value outside `[0, 1]`.
    pub fn new(activity: f64, smell: f64, impulsiveness: f64, cowardice: f64) -> Result<Traits> {
        let traits = Traits {
            activity,
            smell,
            impulsiveness,
            cowardice,
        };

        for kind in TraitKind::ALL {
            let value = traits.get(kind);
            if !(0.0..=1.0).contains(&value) {
                return Err(BearHuntError::InvalidTrait { kind, value });
            }
        }

        Ok(traits)
    }

    /// Samples every trait uniformly from `[0, 1)`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Traits {
        Traits {
            activity: rng.gen(),
            smell: rng.gen(),
            impulsiveness: rng.gen(),
            cowardice: rng.gen(),
        }
    }

    pub fn get(&self, kind: TraitKind) -> f64 {
        match kind {
            TraitKind::Activity => self.activity,
            TraitKind::Smell => self.smell,
            TraitKind::Impulsiveness => self.impulsiveness,
            TraitKind::Cowardice => self.cowardice,
        }
    }

    fn set(&mut self, kind: TraitKind, value: f64) {
        match kind {
            TraitKind::Activity => self.activity = value,
            TraitKind::Smell => self.smell = value,
            TraitKind::Impulsiveness => self.impulsiveness = value,
            TraitKind::Cowardice => self.cowardice = value,
        }
    }

    pub fn activity(&self) -> f64 {
        self.activity
    }

    pub fn smell(&self) -> f64 {
        self.smell
    }

    pub fn impulsiveness(&self) -> f64 {
        self.impulsiveness
    }

    pub fn cowardice(&self) -> f64 {
        self.cowardice
    }
}

/// Which side of a fight came out on top.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Winner {
    /// The bear `fight` was called on.
    Challenger,
    /// The bear passed to `fight`.
    Opponent,
}

/// The result of a fight between two bears.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct FightOutcome {
    pub winner: Winner,
    pub winning_roll: i32,
    pub losing_roll: i32,
}

impl FightOutcome {
    pub fn challenger_won(&self) -> bool {
        self.winner == Winner::Challenger
    }
}

#[derive(Clone, Debug)]
pub struct Bear {
    id: String,
    name: String,
    location: Location,
    direction: Option<Direction>,
    life_points: i32,
    traits: Traits,
    ate_honey: bool,
}

impl Bear {
    pub fn new(name: impl Into<String>, traits: Traits) -> Bear {
        Bear {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            location: Location::default(),
            direction: None,
            life_points: MAX_LIFE_POINTS,
            traits,
            ate_honey: false,
        }
    }

    /// Creates a bear with every trait chosen at random.
    pub fn random<R: Rng + ?Sized>(name: impl Into<String>, rng: &mut R) -> Bear {
        Bear::new(name, Traits::random(rng))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn life_points(&self) -> i32 {
        self.life_points
    }

    pub fn traits(&self) -> &Traits {
        &self.traits
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn ate_honey(&self) -> bool {
        self.ate_honey
    }

    pub fn is_dead(&self) -> bool {
        self.life_points <= 0
    }

    pub(crate) fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    #[cfg(test)]
    pub(crate) fn set_direction(&mut self, direction: Option<Direction>) {
        self.direction = direction;
    }

    #[cfg(test)]
    pub(crate) fn set_life_points(&mut self, life_points: i32) {
        self.life_points = life_points;
    }

    /// Adds (or with a negative delta, removes) life points, never going above the maximum.
    pub fn change_life_points(&mut self, delta: i32) {
        self.life_points = (self.life_points + delta).min(MAX_LIFE_POINTS);
    }

    /// Pays the upkeep every bear owes at the start of its turn.
    pub fn start_turn(&mut self) {
        self.change_life_points(-TURN_LIFE_POINTS);
    }

    /// Returns `true` with the given probability.
    pub fn decide<R: Rng + ?Sized>(probability: f64, rng: &mut R) -> bool {
        rng.gen::<f64>() <= probability
    }

    /// A bear that just ate honey is sluggish: its activity counts for a third on the next check.
    pub fn should_move<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.ate_honey {
            self.ate_honey = false;
            return Bear::decide(self.traits.activity / 3.0, rng);
        }
        Bear::decide(self.traits.activity, rng)
    }

    pub fn should_eat_honey<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        Bear::decide(self.traits.smell, rng)
    }

    /// Not consulted when two bears meet; encounters only ask whether a bear runs away.
    pub fn should_fight<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        Bear::decide(self.traits.impulsiveness, rng)
    }

    pub fn should_avoid_fight<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        Bear::decide(self.traits.cowardice, rng)
    }

    /// Takes a step if the bear feels like moving.
    ///
    /// A bear keeps walking in the same direction for as long as it keeps moving. Once it stands
    /// still it forgets the direction and picks a new random one the next time it moves.
    pub fn move_on<R: Rng + ?Sized>(&mut self, board_size: usize, rng: &mut R) {
        if !self.should_move(rng) {
            self.direction = None;
            return;
        }

        let direction = match self.direction {
            Some(direction) => direction,
            None => {
                let direction: Direction = rng.gen();
                self.direction = Some(direction);
                direction
            }
        };

        self.location = self.location.offset(direction).wrapped(board_size);
    }

    /// Fights another bear.
    ///
    /// Each bear rolls a number between zero and its life points, rolling again on ties. The
    /// higher roll wins: the winner gains the loser's roll and the loser loses the winner's roll.
    /// If neither bear has any life points left there is nothing to roll and the challenger loses
    /// without any points changing hands.
    pub fn fight<R: Rng + ?Sized>(&mut self, other: &mut Bear, rng: &mut R) -> FightOutcome {
        let own_max = self.life_points.max(0);
        let other_max = other.life_points.max(0);

        if own_max == 0 && other_max == 0 {
            return FightOutcome {
                winner: Winner::Opponent,
                winning_roll: 0,
                losing_roll: 0,
            };
        }

        let (own_roll, other_roll) = loop {
            let own_roll = rng.gen_range(0..=own_max);
            let other_roll = rng.gen_range(0..=other_max);
            if own_roll != other_roll {
                break (own_roll, other_roll);
            }
        };

        if own_roll > other_roll {
            other.change_life_points(-own_roll);
            self.change_life_points(other_roll);
            FightOutcome {
                winner: Winner::Challenger,
                winning_roll: own_roll,
                losing_roll: other_roll,
            }
        } else {
            self.change_life_points(-other_roll);
            other.change_life_points(own_roll);
            FightOutcome {
                winner: Winner::Opponent,
                winning_roll: other_roll,
                losing_roll: own_roll,
            }
        }
    }

    /// Hands a tenth of this bear's life points to the bear it ran away from.
    /// Returns the number of points given.
    pub fn give_points_for_fight_avoidance(&mut self, other: &mut Bear) -> i32 {
        let points = self.life_points * FIGHT_AVOIDANCE_PERCENT / 100;
        self.life_points -= points;
        other.change_life_points(points);
        points
    }

    /// Breeds a child with another bear.
    ///
    /// Every trait is taken from one of the two parents at random and slightly perturbed with
    /// gaussian noise, then kept within `[0, 1]`.
    pub fn create_new_bear<R: Rng + ?Sized>(
        &self,
        name: impl Into<String>,
        other: &Bear,
        rng: &mut R,
    ) -> Bear {
        let mut traits = self.traits;

        for kind in TraitKind::ALL {
            let parent = if rng.gen_bool(0.5) { self } else { other };
            let noise: f64 = rng.sample(StandardNormal);
            let value = parent.traits.get(kind) + noise * INHERITANCE_NOISE;
            traits.set(kind, value.clamp(0.0, 1.0));
        }

        Bear::new(name, traits)
    }
}

impl Entity for Bear {
    fn id(&self) -> &str {
        &self.id
    }

    fn location(&self) -> Location {
        self.location
    }

    fn char(&self) -> char {
        'B'
    }

    fn color(&self) -> Color {
        match self.life_points {
            life if life > 50 => Color::Green,
            life if life > 20 => Color::Yellow,
            _ => Color::Red,
        }
    }
}

impl fmt::Display for Bear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "< Bear {}: life points: {}\n\tactivity: {}\n\tsmell: {}\n\timpulsiveness: {}\n\tcowardice: {} >",
            self.name,
            self.life_points,
            self.traits.activity,
            self.traits.smell,
            self.traits.impulsiveness,
            self.traits.cowardice
        )
    }
}

/// The kinds of food that can lie on the board.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum FoodKind {
    Honey,
}

impl FoodKind {
    fn life_points(self) -> i32 {
        match self {
            FoodKind::Honey => 5,
        }
    }
}

/// What happened when a bear was offered food.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EatOutcome {
    /// The food was eaten and must be removed from the board.
    Consumed,
    /// The bear passed on it and the food stays where it is.
    Declined,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Food {
    kind: FoodKind,
    location: Location,
}

impl Food {
    pub fn new(kind: FoodKind, location: Location) -> Food {
        Food { kind, location }
    }

    pub fn honey(location: Location) -> Food {
        Food::new(FoodKind::Honey, location)
    }

    /// Offers the food to a bear.
    pub fn be_eaten_by<R: Rng + ?Sized>(&self, bear: &mut Bear, rng: &mut R) -> EatOutcome {
        match self.kind {
            FoodKind::Honey => {
                if !bear.should_eat_honey(rng) {
                    return EatOutcome::Declined;
                }
                bear.change_life_points(self.kind.life_points());
                bear.ate_honey = true;
            }
        }

        EatOutcome::Consumed
    }
}

impl Entity for Food {
    fn name(&self) -> &str {
        match self.kind {
            FoodKind::Honey => "Honey",
        }
    }

    fn location(&self) -> Location {
        self.location
    }

    fn char(&self) -> char {
        match self.kind {
            FoodKind::Honey => 'H',
        }
    }

    fn color(&self) -> Color {
        match self.kind {
            FoodKind::Honey => Color::DarkYellow,
        }
    }
}
