//! Draft session engine.
//!
//! Owns the pick/pass/timer protocol. Session state lives exclusively in
//! the shared store; every mutation acquires the per-session lock, reads
//! the full aggregate, mutates it in memory, and writes it back before
//! releasing. That discipline turns each operation into an effectively
//! atomic transaction across processes.

use chrono::Utc;
use rand::seq::SliceRandom;
use std::{collections::HashMap, sync::Arc, time::Duration};
use uuid::Uuid;

use crate::bot::{build_deck, select_best_card};
use crate::store::{
    ACTIVE_DRAFTS_KEY, RetryPolicy, SessionLock, StateStore, draft_key, draft_lock_key,
};

use super::config::DraftConfig;
use super::entities::{
    Card, DraftSession, DraftStatus, Pack, PlayerDraftState, PlayerId, SessionId,
};
use super::errors::DraftError;
use super::rules;

/// One seat at the table, human or bot.
#[derive(Clone, Debug)]
pub struct SeatAssignment {
    pub player_id: PlayerId,
    pub is_bot: bool,
}

impl SeatAssignment {
    pub fn human(player_id: impl Into<PlayerId>) -> Self {
        Self {
            player_id: player_id.into(),
            is_bot: false,
        }
    }

    pub fn bot(player_id: impl Into<PlayerId>) -> Self {
        Self {
            player_id: player_id.into(),
            is_bot: true,
        }
    }
}

/// Number of packs each seat drafts over the whole session.
const ROUNDS: usize = 3;

/// Coordinates draft sessions against a shared state store.
///
/// Safe to share across tasks and processes: the manager holds no session
/// state of its own beyond one locked transaction.
pub struct DraftManager {
    store: Arc<dyn StateStore>,
    config: DraftConfig,
}

impl DraftManager {
    pub fn new(store: Arc<dyn StateStore>, config: DraftConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &DraftConfig {
        &self.config
    }

    /// Create and persist a new draft session.
    ///
    /// `packs` must hold exactly three packs per seat. Each pack gets a
    /// fresh identifier; global pack order is shuffled before slicing
    /// three consecutive packs per seat, and each seat's first pack opens
    /// immediately.
    pub async fn create_draft(
        &self,
        session_id: &str,
        seats: Vec<SeatAssignment>,
        packs: Vec<Pack>,
        basic_lands: Vec<Card>,
    ) -> Result<DraftSession, DraftError> {
        let expected = ROUNDS * seats.len();
        if packs.len() != expected {
            return Err(DraftError::MalformedInput {
                expected,
                actual: packs.len(),
            });
        }

        // Fresh ids avoid collisions with caller-supplied ones.
        let mut shuffled: Vec<Pack> = packs
            .into_iter()
            .map(|p| Pack::new(Uuid::new_v4().to_string(), p.cards))
            .collect();
        shuffled.shuffle(&mut rand::rng());

        let now = Utc::now();
        let expires = now + self.pick_window();

        let mut players: HashMap<PlayerId, PlayerDraftState> = HashMap::new();
        let mut seat_order: Vec<PlayerId> = Vec::with_capacity(seats.len());
        for (idx, seat) in seats.iter().enumerate() {
            let mut player = PlayerDraftState::new(seat.player_id.clone(), seat.is_bot, expires);
            let mut own_packs = shuffled[idx * ROUNDS..(idx + 1) * ROUNDS].iter().cloned();
            player.active_pack = own_packs.next();
            player.unopened_packs = own_packs.collect();
            seat_order.push(seat.player_id.clone());
            players.insert(seat.player_id.clone(), player);
        }

        let session = DraftSession {
            session_id: session_id.to_string(),
            seats: seat_order,
            pack_number: 1,
            players,
            basic_lands,
            status: DraftStatus::Drafting,
            is_paused: false,
            start_time: now,
        };

        self.persist(&session).await?;
        self.store
            .set_add(ACTIVE_DRAFTS_KEY, session_id)
            .await?;

        log::info!(
            "created draft {session_id}: {} seats, {} cards",
            session.seats.len(),
            session.card_count()
        );
        Ok(session)
    }

    /// Apply one explicit pick for a player.
    ///
    /// Fails with a `NotFound`-family error when the session, player,
    /// active pack, or card no longer exists; the caller treats that as a
    /// stale request (another device or a timeout autopick got there
    /// first).
    pub async fn pick_card(
        &self,
        session_id: &str,
        player_id: &str,
        card_id: &str,
    ) -> Result<DraftSession, DraftError> {
        let lock = self.lock_session(session_id, self.retry_policy()).await?;
        let result = self.pick_card_locked(session_id, player_id, card_id).await;
        lock.release().await?;
        result
    }

    /// Pick on a player's behalf using the bot heuristic. Used both for
    /// bot turns and human timeout expiry. Returns `Ok(None)` when the
    /// player has nothing to pick from.
    pub async fn auto_pick(
        &self,
        session_id: &str,
        player_id: &str,
    ) -> Result<Option<DraftSession>, DraftError> {
        let lock = self.lock_session(session_id, self.retry_policy()).await?;
        let result = self.auto_pick_locked(session_id, player_id).await;
        lock.release().await?;
        result
    }

    /// Sweep every live session once: autopick for bots, autopick for
    /// humans whose deadline elapsed, expire deck building when a deadline
    /// is configured. Sessions whose lock is held elsewhere are skipped
    /// this tick; a dangling live-set entry is pruned.
    ///
    /// Returns the sessions that changed, for the caller to broadcast.
    pub async fn check_timers(&self) -> Result<Vec<(SessionId, DraftSession)>, DraftError> {
        let mut updated = Vec::new();

        for session_id in self.store.set_members(ACTIVE_DRAFTS_KEY).await? {
            let lock = match SessionLock::acquire(
                self.store.clone(),
                &draft_lock_key(&session_id),
                self.config.lock_ttl,
                RetryPolicy::FailFast,
            )
            .await?
            {
                Some(lock) => lock,
                None => {
                    // Another process is mutating this session; its next
                    // tick will pick it back up.
                    log::debug!("timer sweep skipping contended draft {session_id}");
                    continue;
                }
            };

            let result = self.sweep_session_locked(&session_id).await;
            lock.release().await?;

            match result {
                Ok(Some(session)) => updated.push((session_id, session)),
                Ok(None) => {}
                Err(e) => {
                    // Timer-driven picks never surface errors to users.
                    log::error!("timer sweep failed for draft {session_id}: {e}");
                }
            }
        }

        Ok(updated)
    }

    /// Toggle the pause flag. Unpausing grants every player holding an
    /// active pack a fresh full think-time window so nobody is timed out
    /// by wall-clock time that passed during the pause.
    pub async fn set_paused(&self, session_id: &str, paused: bool) -> Result<(), DraftError> {
        let lock = self.lock_session(session_id, self.retry_policy()).await?;
        let result = self.set_paused_locked(session_id, paused).await;
        lock.release().await?;
        result
    }

    /// Lock-free snapshot read of a session.
    pub async fn get_draft(&self, session_id: &str) -> Result<Option<DraftSession>, DraftError> {
        self.load(session_id).await
    }

    // --- locked bodies -----------------------------------------------

    async fn pick_card_locked(
        &self,
        session_id: &str,
        player_id: &str,
        card_id: &str,
    ) -> Result<DraftSession, DraftError> {
        let mut session = self
            .load(session_id)
            .await?
            .ok_or_else(|| DraftError::SessionNotFound(session_id.to_string()))?;

        self.apply_pick(&mut session, player_id, card_id)?;
        self.persist(&session).await?;
        Ok(session)
    }

    async fn auto_pick_locked(
        &self,
        session_id: &str,
        player_id: &str,
    ) -> Result<Option<DraftSession>, DraftError> {
        let mut session = match self.load(session_id).await? {
            Some(session) => session,
            None => return Ok(None),
        };

        if !self.apply_auto_pick(&mut session, player_id)? {
            return Ok(None);
        }
        self.persist(&session).await?;
        Ok(Some(session))
    }

    async fn sweep_session_locked(
        &self,
        session_id: &str,
    ) -> Result<Option<DraftSession>, DraftError> {
        let Some(mut session) = self.load(session_id).await? else {
            // Dangling identifier: the blob is gone, drop the set entry.
            log::warn!("pruning dangling draft {session_id} from live set");
            self.store.set_remove(ACTIVE_DRAFTS_KEY, session_id).await?;
            return Ok(None);
        };

        if session.is_paused {
            return Ok(None);
        }

        let mut changed = false;
        match session.status {
            DraftStatus::Drafting => {
                let now = Utc::now();
                for player_id in session.seats.clone() {
                    let due = session.players.get(&player_id).is_some_and(|p| {
                        p.active_pack.as_ref().is_some_and(|pack| !pack.is_empty())
                            && (p.is_bot || p.pick_expires_at <= now)
                    });
                    if !due {
                        continue;
                    }
                    match self.apply_auto_pick(&mut session, &player_id) {
                        Ok(picked) => changed |= picked,
                        Err(e) => {
                            log::error!(
                                "autopick failed for {player_id} in draft {session_id}: {e}"
                            );
                        }
                    }
                }
            }
            DraftStatus::DeckBuilding => {
                if let Some(limit) = self.config.deck_building_time
                    && Utc::now() - session.start_time >= to_delta(limit)
                {
                    session.status = DraftStatus::Complete;
                    changed = true;
                    log::info!("draft {session_id} deck building timed out, marking complete");
                }
            }
            DraftStatus::Complete => {}
        }

        if !changed {
            return Ok(None);
        }
        self.persist(&session).await?;
        Ok(Some(session))
    }

    async fn set_paused_locked(&self, session_id: &str, paused: bool) -> Result<(), DraftError> {
        let mut session = self
            .load(session_id)
            .await?
            .ok_or_else(|| DraftError::SessionNotFound(session_id.to_string()))?;

        session.is_paused = paused;
        if !paused {
            let expires = Utc::now() + self.pick_window();
            for player in session.players.values_mut() {
                if player.active_pack.is_some() {
                    player.pick_expires_at = expires;
                }
            }
        }

        self.persist(&session).await?;
        log::info!(
            "draft {session_id} {}",
            if paused { "paused" } else { "resumed" }
        );
        Ok(())
    }

    // --- pick/pass machinery -----------------------------------------

    /// Autopick via the heuristic. Returns false when the player is
    /// absent or has no non-empty active pack.
    fn apply_auto_pick(
        &self,
        session: &mut DraftSession,
        player_id: &str,
    ) -> Result<bool, DraftError> {
        let Some(player) = session.players.get(player_id) else {
            return Ok(false);
        };
        let Some(pack) = &player.active_pack else {
            return Ok(false);
        };
        let Some(card) = select_best_card(&pack.cards, &player.pool) else {
            return Ok(false);
        };
        let card_id = card.id.clone();
        self.apply_pick(session, player_id, &card_id)?;
        Ok(true)
    }

    /// Core pick/pass transition, run while holding the session lock.
    fn apply_pick(
        &self,
        session: &mut DraftSession,
        player_id: &str,
        card_id: &str,
    ) -> Result<(), DraftError> {
        let seat_idx = session
            .seat_of(player_id)
            .ok_or_else(|| DraftError::PlayerNotFound(player_id.to_string()))?;
        let seat_count = session.seats.len();
        let pack_number = session.pack_number;

        let player = session
            .players
            .get_mut(player_id)
            .ok_or_else(|| DraftError::PlayerNotFound(player_id.to_string()))?;
        let pack = player
            .active_pack
            .as_mut()
            .ok_or_else(|| DraftError::NoActivePack(player_id.to_string()))?;

        let card = pack
            .remove_card(card_id)
            .ok_or_else(|| DraftError::CardNotFound(card_id.to_string()))?;
        player.pool.push(card);
        player.picked_in_current_step += 1;

        // The player keeps picking from this pack until the table's
        // picks-per-turn are taken or the pack runs dry.
        if player.picked_in_current_step < rules::picks_required(seat_count) && !pack.is_empty() {
            return Ok(());
        }

        player.picked_in_current_step = 0;
        let Some(vacated) = player.active_pack.take() else {
            return Err(DraftError::NoActivePack(player_id.to_string()));
        };

        // An emptied pack is simply discarded, never passed.
        let mut passed_to = None;
        if !vacated.is_empty() {
            let neighbor_idx = rules::receiving_seat(seat_idx, seat_count, pack_number);
            let neighbor_id = session.seats[neighbor_idx].clone();
            if let Some(neighbor) = session.players.get_mut(&neighbor_id) {
                neighbor.queue.push_back(vacated);
                passed_to = Some(neighbor_id);
            }
        }
        if let Some(neighbor_id) = &passed_to {
            self.promote_from_queue(session, neighbor_id);
        }

        self.promote_from_queue(session, player_id);

        let waiting = {
            let player = session
                .players
                .get_mut(player_id)
                .ok_or_else(|| DraftError::PlayerNotFound(player_id.to_string()))?;
            player.is_waiting = player.active_pack.is_none();
            player.is_waiting
        };

        if waiting && session.all_waiting() {
            self.advance_round(session);
        }

        Ok(())
    }

    /// Open the head of a player's pass-in queue if their active slot is
    /// empty: fresh pick counter, fresh deadline.
    fn promote_from_queue(&self, session: &mut DraftSession, player_id: &str) {
        let expires = Utc::now() + self.pick_window();
        if let Some(player) = session.players.get_mut(player_id)
            && player.active_pack.is_none()
            && let Some(pack) = player.queue.pop_front()
        {
            player.active_pack = Some(pack);
            player.picked_in_current_step = 0;
            player.pick_expires_at = expires;
            player.is_waiting = false;
        }
    }

    /// Round-completion barrier: every seat is out of packs. Either open
    /// the next round's packs or move the session into deck building.
    fn advance_round(&self, session: &mut DraftSession) {
        if session.pack_number < ROUNDS as u8 {
            session.pack_number += 1;
            let expires = Utc::now() + self.pick_window();
            for player in session.players.values_mut() {
                player.active_pack = player.unopened_packs.pop_front();
                player.picked_in_current_step = 0;
                player.pick_expires_at = expires;
                player.is_waiting = false;
            }
            log::info!(
                "draft {} advanced to pack {}",
                session.session_id,
                session.pack_number
            );
            return;
        }

        session.status = DraftStatus::DeckBuilding;
        session.start_time = Utc::now();
        for player in session.players.values_mut() {
            if player.is_bot {
                player.deck = Some(build_deck(&player.pool, &session.basic_lands));
            }
        }
        log::info!("draft {} moved to deck building", session.session_id);
    }

    // --- store plumbing ----------------------------------------------

    async fn load(&self, session_id: &str) -> Result<Option<DraftSession>, DraftError> {
        match self.store.get(&draft_key(session_id)).await? {
            Some(blob) => Ok(Some(
                serde_json::from_str(&blob).map_err(crate::store::StoreError::from)?,
            )),
            None => Ok(None),
        }
    }

    async fn persist(&self, session: &DraftSession) -> Result<(), DraftError> {
        let blob = serde_json::to_string(session).map_err(crate::store::StoreError::from)?;
        self.store.set(&draft_key(&session.session_id), &blob).await?;
        Ok(())
    }

    async fn lock_session(
        &self,
        session_id: &str,
        policy: RetryPolicy,
    ) -> Result<SessionLock, DraftError> {
        let key = draft_lock_key(session_id);
        SessionLock::acquire(self.store.clone(), &key, self.config.lock_ttl, policy)
            .await?
            .ok_or(DraftError::LockContention { key })
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::BoundedRetry {
            interval: self.config.lock_retry_interval,
            max_wait: self.config.lock_retry_max,
        }
    }

    fn pick_window(&self) -> chrono::TimeDelta {
        to_delta(self.config.pick_time)
    }
}

fn to_delta(duration: Duration) -> chrono::TimeDelta {
    chrono::TimeDelta::from_std(duration).unwrap_or(chrono::TimeDelta::MAX)
}

/// Drive [`DraftManager::check_timers`] on a fixed cadence. The caller
/// owns the returned handle; aborting it stops the sweep.
pub fn spawn_timer_sweep(
    manager: Arc<DraftManager>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = manager.check_timers().await {
                log::error!("timer sweep errored: {e}");
            }
        }
    })
}
