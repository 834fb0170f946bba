use super::types::{GameEvent, ServerState, WorldUpdate};
use super::world::{World, WorldSettings};
use crate::domain::{PhysicsError, ScoreKeeper};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tracing::{debug, error, info};

pub async fn world_task(
    input_rx: mpsc::Receiver<GameEvent>,
    world_tx: broadcast::Sender<WorldUpdate>,
    server_state_tx: watch::Sender<ServerState>,
    settings: WorldSettings,
    score: ScoreKeeper,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) {
    let world = World::new(settings, score);
    run_world(
        world,
        input_rx,
        world_tx,
        server_state_tx,
        tick_interval,
        shutdown,
    )
    .await;
}

async fn run_world(
    mut world: World<ScoreKeeper>,
    mut input_rx: mpsc::Receiver<GameEvent>,
    world_tx: broadcast::Sender<WorldUpdate>,
    server_state_tx: watch::Sender<ServerState>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) {
    let mut tick: u64 = 0;
    let dt = tick_interval.as_secs_f32();

    // Drive the fixed-step game loop at the configured tick rate.
    let mut interval = tokio::time::interval(tick_interval);
    let _ = server_state_tx.send(ServerState::Running);
    info!(tick_ms = tick_interval.as_millis() as u64, "world running");

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!(tick, "world shutting down");
                break;
            }
            _ = interval.tick() => {}
        }

        if let Err(e) = run_tick(&mut world, &mut input_rx, dt) {
            // Bad handles or templates are configuration faults; stop simulating.
            error!(tick, error = ?e, "world halted");
            let _ = server_state_tx.send(ServerState::Halted);
            break;
        }

        tick += 1;
        let _ = world_tx.send(WorldUpdate {
            tick,
            score: world.score().points(),
            players: world.players(),
            orbs: world.orbs(),
        });
    }
}

fn run_tick(
    world: &mut World<ScoreKeeper>,
    input_rx: &mut mpsc::Receiver<GameEvent>,
    dt: f32,
) -> Result<(), PhysicsError> {
    while let Ok(ev) = input_rx.try_recv() {
        world.apply(ev)?;
    }

    let report = world.step(dt)?;
    if report.visibility_exits > 0 {
        debug!(
            exits = report.visibility_exits,
            score = world.score().points(),
            "score adjusted"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlayerInput;
    use tokio::time::timeout;

    const TICK: Duration = Duration::from_millis(5);

    struct Harness {
        input_tx: mpsc::Sender<GameEvent>,
        world_rx: broadcast::Receiver<WorldUpdate>,
        state_rx: watch::Receiver<ServerState>,
        shutdown: Arc<Notify>,
        task: tokio::task::JoinHandle<()>,
    }

    fn start(settings: WorldSettings, score: ScoreKeeper) -> Harness {
        let (input_tx, input_rx) = mpsc::channel(64);
        let (world_tx, world_rx) = broadcast::channel(1024);
        let (state_tx, state_rx) = watch::channel(ServerState::Starting);
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(world_task(
            input_rx,
            world_tx,
            state_tx,
            settings,
            score,
            TICK,
            shutdown.clone(),
        ));
        Harness {
            input_tx,
            world_rx,
            state_rx,
            shutdown,
            task,
        }
    }

    async fn next_update_where(
        rx: &mut broadcast::Receiver<WorldUpdate>,
        pred: impl Fn(&WorldUpdate) -> bool,
    ) -> WorldUpdate {
        timeout(Duration::from_secs(5), async {
            loop {
                let update = rx.recv().await.expect("world updates should keep flowing");
                if pred(&update) {
                    return update;
                }
            }
        })
        .await
        .expect("expected matching world update")
    }

    #[tokio::test]
    async fn when_player_holds_fire_then_updates_carry_orbs() {
        let mut h = start(WorldSettings::default(), ScoreKeeper::new());

        h.input_tx
            .send(GameEvent::Join { player_id: 1 })
            .await
            .unwrap();
        h.input_tx
            .send(GameEvent::Input {
                player_id: 1,
                input: PlayerInput {
                    fire: true,
                    ..PlayerInput::default()
                },
            })
            .await
            .unwrap();

        let update = next_update_where(&mut h.world_rx, |u| u.orbs.len() >= 3).await;

        assert_eq!(update.players.len(), 1);
        assert_eq!(*h.state_rx.borrow(), ServerState::Running);
        h.shutdown.notify_one();
        timeout(Duration::from_secs(5), h.task)
            .await
            .expect("world task should stop on shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn when_ship_leaves_the_view_then_shared_score_drops() {
        let score = ScoreKeeper::new();
        let mut h = start(
            WorldSettings {
                player_tuning: crate::domain::tuning::player::PlayerTuning {
                    engine_power: 4000.0,
                    ..Default::default()
                },
                ..WorldSettings::default()
            },
            score.clone(),
        );

        h.input_tx
            .send(GameEvent::Join { player_id: 3 })
            .await
            .unwrap();
        // Let the ship be seen before pushing it out.
        next_update_where(&mut h.world_rx, |u| u.players.iter().any(|p| p.visible)).await;
        h.input_tx
            .send(GameEvent::Input {
                player_id: 3,
                input: PlayerInput {
                    vertical: 1.0,
                    ..PlayerInput::default()
                },
            })
            .await
            .unwrap();

        let update = next_update_where(&mut h.world_rx, |u| u.score < 0).await;

        assert_eq!(update.score, -1);
        assert_eq!(score.points(), -1);
        h.shutdown.notify_one();
    }

    #[tokio::test]
    async fn when_a_player_body_goes_missing_then_world_halts() {
        let mut world = World::new(WorldSettings::default(), ScoreKeeper::new());
        world.join(7);
        let body = world.player(7).unwrap().body();
        world.physics_mut().despawn(body).unwrap();

        let (_input_tx, input_rx) = mpsc::channel(8);
        let (world_tx, mut world_rx) = broadcast::channel(8);
        let (state_tx, mut state_rx) = watch::channel(ServerState::Starting);
        let task = tokio::spawn(run_world(
            world,
            input_rx,
            world_tx,
            state_tx,
            TICK,
            Arc::new(Notify::new()),
        ));

        timeout(Duration::from_secs(5), task)
            .await
            .expect("world task should stop on its own")
            .unwrap();

        assert_eq!(*state_rx.borrow_and_update(), ServerState::Halted);
        assert!(world_rx.try_recv().is_err());
    }
}
