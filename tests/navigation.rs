//! Navigation through a generated dungeon: moves, exploration, room hooks
//! and entry positions.

use std::collections::{HashMap, VecDeque};
use undercroft::{
    Direction, Dungeon, GameEvent, GameState, GenerationConfig, GridPos, PlayerInput, RoomEvent,
    UndercroftResult,
};

fn dungeon(seed: u64) -> Dungeon {
    Dungeon::new(GenerationConfig::for_testing(seed)).unwrap()
}

/// Shortest door route from the current room to `target`.
fn route(dungeon: &Dungeon, target: GridPos) -> Vec<Direction> {
    let start = dungeon.current_pos();
    let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    while let Some(pos) = queue.pop_front() {
        for &next in dungeon.graph().neighbors(pos) {
            if next != start && !came_from.contains_key(&next) {
                came_from.insert(next, pos);
                queue.push_back(next);
            }
        }
    }

    let mut steps = Vec::new();
    let mut pos = target;
    while pos != start {
        let prev = came_from[&pos];
        steps.push(prev.direction_to(pos).unwrap());
        pos = prev;
    }
    steps.reverse();
    steps
}

#[test]
fn test_can_move_matches_current_room_doors() {
    for seed in 0..20 {
        let dungeon = dungeon(seed);
        let room = dungeon.current_room().unwrap();
        for direction in Direction::ALL {
            assert_eq!(dungeon.can_move(direction), room.doors.get(direction));
        }
    }
}

#[test]
fn test_walking_every_route_explores_every_room() {
    let mut dungeon = dungeon(17);
    let targets: Vec<GridPos> = dungeon.rooms().map(|(pos, _)| pos).collect();

    for target in targets {
        for direction in route(&dungeon, target) {
            assert!(dungeon.try_move(direction));
        }
        assert_eq!(dungeon.current_pos(), target);
    }
    assert_eq!(dungeon.explored().len(), dungeon.room_count());
}

#[test]
fn test_failed_move_changes_nothing() {
    let mut dungeon = dungeon(4);
    let Some(closed) = Direction::ALL.into_iter().find(|&d| !dungeon.can_move(d)) else {
        return;
    };
    let before = dungeon.current_pos();
    assert!(!dungeon.try_move(closed));
    assert_eq!(dungeon.current_pos(), before);
    assert_eq!(dungeon.explored().len(), 1);
    assert!(dungeon.move_and_enter(closed).unwrap().is_none());
}

#[test]
fn test_room_depth_tracks_current_room() {
    let mut dungeon = dungeon(6);
    assert_eq!(dungeon.room_depth(None), Some(0));
    let direction = Direction::ALL
        .into_iter()
        .find(|&d| dungeon.can_move(d))
        .unwrap();
    dungeon.try_move(direction);
    assert_eq!(dungeon.room_depth(None), Some(1));
    assert_eq!(dungeon.room_depth(Some(GridPos::new(-1, -1))), None);
}

#[test]
fn test_entry_position_per_direction() {
    let mut dungeon = dungeon(12);
    let direction = Direction::ALL
        .into_iter()
        .find(|&d| dungeon.can_move(d))
        .unwrap();
    dungeon.try_move(direction);

    let room = dungeon.current_room().unwrap().clone();
    let tile = dungeon.config().tile_size as f32;
    let margin = dungeon.config().entry_margin;
    let (pw, ph) = (16.0, 24.0);
    let left = room.bounds.x as f32 * tile;
    let top = room.bounds.y as f32 * tile;
    let right = room.bounds.right() as f32 * tile;
    let bottom = room.bounds.bottom() as f32 * tile;

    let (x, y) = dungeon.entry_position(Direction::North, pw, ph).unwrap();
    assert_eq!(y, bottom - ph - margin);
    assert_eq!(x, (left + right) / 2.0 - pw / 2.0);

    let (_, y) = dungeon.entry_position(Direction::South, pw, ph).unwrap();
    assert_eq!(y, top + margin);

    let (x, y) = dungeon.entry_position(Direction::East, pw, ph).unwrap();
    assert_eq!(x, left + margin);
    assert_eq!(y, (top + bottom) / 2.0 - ph / 2.0);

    let (x, _) = dungeon.entry_position(Direction::West, pw, ph).unwrap();
    assert_eq!(x, right - pw - margin);
}

#[test]
fn test_boss_room_hooks() -> UndercroftResult<()> {
    let mut dungeon = dungeon(42);
    assert!(dungeon.enter_initial_room()?.is_empty());
    let boss = dungeon.boss().unwrap();
    let steps = route(&dungeon, boss);
    let (last, approach) = steps.split_last().unwrap();

    for &direction in approach {
        dungeon.try_move(direction);
    }
    let events = dungeon.move_and_enter(*last)?.unwrap();
    assert_eq!(events[0], RoomEvent::Left);
    assert!(events
        .iter()
        .any(|e| matches!(e, RoomEvent::BossAwakened { .. })));
    assert!(events.contains(&RoomEvent::DoorsLocked));

    let room = dungeon.current_room_mut().unwrap();
    assert!(room.locked);
    assert!(room.boss_active);
    let cleared = room.clear_enemies();
    assert!(cleared.contains(&RoomEvent::DoorsUnlocked));
    Ok(())
}

#[test]
fn test_game_state_walk_to_boss_and_win() -> UndercroftResult<()> {
    let mut state = GameState::new(GenerationConfig::for_testing(42))?;
    let boss = state.dungeon.boss().unwrap();

    for direction in route(&state.dungeon, boss) {
        // Fight through any room that seals its doors on the way
        if state.dungeon.current_room().is_some_and(|room| room.locked) {
            state.handle_input(PlayerInput::ClearRoom)?;
        }
        state.handle_input(PlayerInput::Move(direction))?;
    }
    assert_eq!(state.dungeon.current_pos(), boss);

    // The boss guards its chest
    assert!(state.handle_input(PlayerInput::OpenContainer).is_err());

    let events = state.handle_input(PlayerInput::ClearRoom)?;
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::Room {
            event: RoomEvent::RoomCleared { boss: Some(_) },
            ..
        }
    )));
    assert_eq!(state.statistics.bosses_defeated, 1);

    let events = state.handle_input(PlayerInput::OpenContainer)?;
    assert!(matches!(events[0], GameEvent::ContainerOpened { .. }));
    assert_eq!(state.statistics.items_found, 1);
    Ok(())
}

#[test]
fn test_encounters_do_not_depend_on_visit_order() -> UndercroftResult<()> {
    let seed = 31;
    let mut a = dungeon(seed);
    let mut b = dungeon(seed);
    let targets: Vec<GridPos> = a.rooms().map(|(pos, _)| pos).collect();

    // Visit every room forwards in one copy and backwards in the other
    for target in &targets {
        for direction in route(&a, *target) {
            a.move_and_enter(direction)?;
        }
    }
    for target in targets.iter().rev() {
        for direction in route(&b, *target) {
            b.move_and_enter(direction)?;
        }
    }

    for target in &targets {
        let ra = a.room_at(*target).unwrap();
        let rb = b.room_at(*target).unwrap();
        assert_eq!(ra.enemies, rb.enemies, "encounters differ at {target}");
        assert_eq!(ra.shop_stock, rb.shop_stock);
    }
    Ok(())
}
