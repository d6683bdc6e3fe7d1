use crate::config::GameConfig;
use crate::entities::{Bear, EatOutcome, Entity, Food};
use crate::error::{BearHuntError, Result};
use crate::generation::next_generation;
use crate::location::Location;
use crate::map::{Board, Occupant};
use crate::replay::{create_replay_logger, ReplayLogger};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace};

/// The Bear Hunt game.
/// Main entry point for running the simulation.
pub struct Game {
    board: Board,
    config: GameConfig,
    round: usize,
    generated: bool,
    finished_reason: Option<FinishedReason>,
    replay_logger: Box<dyn ReplayLogger>,
    rng: StdRng,
}

/// Represents the reason the game finished.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FinishedReason {
    /// The game ended because every bear died.
    Extinct,
    /// The game ended because there was only one bear left.
    LoneSurvivor,
    /// The game ended because the requested number of rounds was played.
    RoundLimitReached,
}

impl Game {
    /// Creates a new game with an empty board.
    pub fn new(config: GameConfig) -> Result<Game> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Game {
            board: Board::new(config.board_size)?,
            replay_logger: create_replay_logger(config.replay_filename.clone(), config.board_size),
            config,
            round: 0,
            generated: false,
            finished_reason: None,
            rng,
        })
    }

    /// Creates a game whose world is already laid out.
    ///
    /// The board size is taken from the layout rather than the configuration. See
    /// [`Board::parse`] for the layout format.
    pub fn from_layout(layout: &str, config: GameConfig) -> Result<Game> {
        let mut game = Game::new(config)?;
        let board = Board::parse(layout, &mut game.rng)?;

        game.config.board_size = board.size();
        game.replay_logger =
            create_replay_logger(game.config.replay_filename.clone(), board.size());
        game.board = board;
        game.generated = true;
        game.log_spawns();

        Ok(game)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn finished_reason(&self) -> Option<FinishedReason> {
        self.finished_reason
    }

    /// The bears that are still alive.
    pub fn survivors(&self) -> &[Bear] {
        self.board.bears()
    }

    /// Creates bears with random traits using the game's random number generator.
    pub fn random_bears(&mut self, count: usize) -> Vec<Bear> {
        (0..count)
            .map(|i| Bear::random(i.to_string(), &mut self.rng))
            .collect()
    }

    /// Breeds children from the healthiest survivors. See [`next_generation`].
    pub fn breed_next_generation(&mut self) -> Option<Vec<Bear>> {
        next_generation(self.board.bears(), &mut self.rng)
    }

    /// Places the bears and their honey on the board.
    ///
    /// Every bear brings `honey_per_bear` jars of honey with it. Fails without touching the board
    /// if they do not all fit, or if this game already has a world.
    pub fn generate_world(&mut self, bears: Vec<Bear>) -> Result<()> {
        let required = self.config.required_cells(bears.len());
        if required > self.board.cells() {
            return Err(BearHuntError::CapacityExceeded {
                required,
                cells: self.board.cells(),
            });
        }

        if self.generated {
            return Err(BearHuntError::WorldAlreadyGenerated {
                bears: self.board.bears().len(),
            });
        }

        let honey = bears.len() * self.config.honey_per_bear;

        for bear in bears {
            let location = self.board.random_empty_cell(&mut self.rng)?;
            self.board.place_bear(bear, location);
        }

        for _ in 0..honey {
            let location = self.board.random_empty_cell(&mut self.rng)?;
            self.board.place_food(Food::honey(location));
        }

        self.generated = true;
        self.log_spawns();

        info!(
            board_size = self.board.size(),
            bears = self.board.bears().len(),
            honey,
            "Generated world"
        );

        Ok(())
    }

    /// Plays the given number of rounds and returns the bears left alive.
    ///
    /// In every round each bear that was alive when the round started takes one turn, in the
    /// order they were placed on the board. A bear killed before its turn comes up is skipped,
    /// so bears placed early get to act on the others first.
    ///
    /// If `stop_when_settled` is set, the game ends as soon as a round leaves one bear or none.
    ///
    /// Every call finishes by recording why it stopped and saving the replay. Calling `play` again
    /// continues from the current round and overwrites both, so the replay always covers every
    /// round played so far.
    pub fn play(&mut self, rounds: usize) -> Result<&[Bear]> {
        for _ in 0..rounds {
            self.round += 1;

            let ids: Vec<String> = self
                .board
                .bears()
                .iter()
                .map(|bear| bear.id().to_string())
                .collect();

            for id in &ids {
                self.run_turn(id)?;
            }

            let bears = self.board.bears().len();
            let honey = self.board.foods().len();
            self.replay_logger.log_round(self.round, bears, honey);
            debug!(round = self.round, bears, honey, "Round finished");

            if self.config.stop_when_settled && bears <= 1 {
                let reason = match bears {
                    0 => FinishedReason::Extinct,
                    _ => FinishedReason::LoneSurvivor,
                };
                self.finish(reason)?;
                return Ok(self.board.bears());
            }
        }

        self.finish(FinishedReason::RoundLimitReached)?;
        Ok(self.board.bears())
    }

    /// Plays a single turn for the bear with the given id.
    ///
    /// The bear pays its upkeep, moves, and then deals with whatever it walked into: another bear
    /// means an encounter, food is offered to it. Dead bears are removed from the board. Does
    /// nothing if the bear is no longer on the board.
    pub fn run_turn(&mut self, id: &str) -> Result<()> {
        let Some(index) = self.board.bear_index(id) else {
            return Ok(());
        };

        let Some((from, to)) = self.take_step(index) else {
            return Ok(());
        };

        if from != to {
            trace!(round = self.round, bear = id, ?from, ?to, "Bear moved");
            self.replay_logger
                .log_move_bear(self.round, id.to_string(), from, to);
        }

        match self.board.occupant(to, Some(index)) {
            Some(Occupant::Bear(other)) => {
                let other_id = self.board.bears()[other].id().to_string();
                self.resolve_encounter(index, other)?;
                self.remove_if_dead(&other_id);
            }
            Some(Occupant::Food(food)) => self.feed(index, food),
            None => {}
        }

        self.remove_if_dead(id);

        Ok(())
    }

    /// Writes the board to standard output.
    pub fn print_world(&self) {
        print!("{}", self.board.render());
    }

    /// Draws the board to the console in colour.
    pub fn draw(&self) -> Result<()> {
        self.board.draw(self.round)
    }
}

impl Game {
    fn take_step(&mut self, index: usize) -> Option<(Location, Location)> {
        let size = self.board.size();
        let bear = self.board.bear_mut(index)?;

        bear.start_turn();
        let from = bear.location();
        bear.move_on(size, &mut self.rng);

        Some((from, bear.location()))
    }

    fn resolve_encounter(&mut self, challenger: usize, opponent: usize) -> Result<()> {
        let challenger_avoids = self.board.bears()[challenger].should_avoid_fight(&mut self.rng);
        let opponent_avoids = self.board.bears()[opponent].should_avoid_fight(&mut self.rng);

        match (challenger_avoids, opponent_avoids) {
            (true, true) => {
                debug!(round = self.round, "Both bears ran away");
                self.relocate(challenger)?;
                // The cell the challenger came from may have been the only free one
                if self.board.is_full() {
                    debug!(round = self.round, "No free cell left, the other bear stays");
                } else {
                    self.relocate(opponent)?;
                }
            }
            (true, false) => self.avoid_fight(challenger, opponent)?,
            (false, true) => self.avoid_fight(opponent, challenger)?,
            (false, false) => self.fight(challenger, opponent)?,
        }

        Ok(())
    }

    fn avoid_fight(&mut self, avoider: usize, other: usize) -> Result<()> {
        let (avoiding_bear, other_bear) = self.board.bear_pair_mut(avoider, other);
        let points = avoiding_bear.give_points_for_fight_avoidance(other_bear);

        let avoider_id = avoiding_bear.id().to_string();
        let other_id = other_bear.id().to_string();
        let location = other_bear.location();

        debug!(
            round = self.round,
            avoider = %avoider_id,
            other = %other_id,
            points,
            "Bear avoided a fight"
        );
        self.replay_logger
            .log_avoid(self.round, avoider_id, other_id, location, points);

        self.relocate(avoider)
    }

    fn fight(&mut self, challenger: usize, opponent: usize) -> Result<()> {
        let (challenging_bear, opposing_bear) = self.board.bear_pair_mut(challenger, opponent);
        let outcome = challenging_bear.fight(opposing_bear, &mut self.rng);

        let (winner, loser) = if outcome.challenger_won() {
            (challenger, opponent)
        } else {
            (opponent, challenger)
        };

        let bears = self.board.bears();
        let winner_id = bears[winner].id().to_string();
        let loser_id = bears[loser].id().to_string();
        let location = bears[winner].location();

        debug!(
            round = self.round,
            winner = %winner_id,
            loser = %loser_id,
            winning_roll = outcome.winning_roll,
            losing_roll = outcome.losing_roll,
            "Bears fought"
        );
        self.replay_logger.log_fight(
            self.round,
            winner_id,
            loser_id,
            location,
            outcome.winning_roll,
        );

        // The winner keeps the cell
        self.relocate(loser)
    }

    fn relocate(&mut self, index: usize) -> Result<()> {
        let destination = self.board.random_empty_cell(&mut self.rng)?;
        let bear = &self.board.bears()[index];
        let id = bear.id().to_string();
        let location = bear.location();

        self.board.relocate_bear(index, destination);
        self.replay_logger
            .log_relocate(self.round, id, location, destination);

        Ok(())
    }

    fn feed(&mut self, bear: usize, food: usize) {
        if self.board.offer_food(bear, food, &mut self.rng) == EatOutcome::Declined {
            return;
        }

        let eaten = self.board.remove_food(food);
        let id = self.board.bears()[bear].id().to_string();

        trace!(round = self.round, bear = %id, food = eaten.name(), "Bear ate");
        self.replay_logger
            .log_eat(self.round, id, eaten.name(), eaten.location());
    }

    fn remove_if_dead(&mut self, id: &str) {
        let Some(index) = self.board.bear_index(id) else {
            return;
        };

        if !self.board.bears()[index].is_dead() {
            return;
        }

        let bear = self.board.remove_bear(index);
        debug!(
            round = self.round,
            bear = bear.name(),
            life_points = bear.life_points(),
            "Bear died"
        );
        self.replay_logger
            .log_death(self.round, id.to_string(), bear.location());
    }

    fn finish(&mut self, reason: FinishedReason) -> Result<()> {
        self.finished_reason = Some(reason);

        info!(
            round = self.round,
            survivors = self.board.bears().len(),
            ?reason,
            "Game finished"
        );

        self.replay_logger.log_end_game(format!("{:?}", reason));
        self.replay_logger.save()
    }

    fn log_spawns(&mut self) {
        for bear in self.board.bears() {
            self.replay_logger
                .log_spawn_bear(self.round, bear.id().to_string(), bear.location());
        }

        for food in self.board.foods() {
            self.replay_logger
                .log_spawn_food(self.round, food.name(), food.location());
        }

        self.replay_logger.log_round(
            self.round,
            self.board.bears().len(),
            self.board.foods().len(),
        );
    }
}
