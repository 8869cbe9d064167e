//! # ASCII Rendering
//!
//! Text dumps of the room grid and of single rooms.

use crate::{Dungeon, GridPos, Room, RoomRole, TileKind};

/// Minimap glyph for the room at `pos`.
fn room_glyph(dungeon: &Dungeon, pos: GridPos, room: &Room) -> char {
    if pos == dungeon.current_pos() {
        return '@';
    }
    match room.role {
        RoomRole::Boss(_) => 'B',
        RoomRole::Shop => '$',
        RoomRole::Treasure => 'T',
        RoomRole::Normal if pos == dungeon.start() => 'S',
        RoomRole::Normal if room.cleared => 'x',
        RoomRole::Normal if dungeon.is_explored(pos) => '.',
        RoomRole::Normal => ' ',
    }
}

/// Renders the whole room grid with door connectors.
///
/// Each room is drawn as `[g]`, with `-` between rooms linked east-west and
/// `|` between rooms linked north-south.
///
/// # Examples
///
/// ```
/// use undercroft::{render_minimap, Dungeon, GenerationConfig};
///
/// let dungeon = Dungeon::new(GenerationConfig::for_testing(42)).unwrap();
/// let map = render_minimap(&dungeon);
/// assert!(map.contains("[@]"));
/// assert!(map.contains("[B]"));
/// ```
pub fn render_minimap(dungeon: &Dungeon) -> String {
    let graph = dungeon.graph();
    let mut lines = Vec::with_capacity(graph.height() as usize * 2);

    for y in 0..graph.height() {
        let mut row = String::new();
        let mut links = String::new();
        for x in 0..graph.width() {
            let pos = GridPos::new(x, y);
            match graph.get(pos) {
                Some(room) => {
                    row.push('[');
                    row.push(room_glyph(dungeon, pos, room));
                    row.push(']');
                    row.push(if room.doors.east { '-' } else { ' ' });
                    links.push_str(if room.doors.south { " | " } else { "   " });
                }
                None => {
                    row.push_str("    ");
                    links.push_str("   ");
                }
            }
            links.push(' ');
        }
        lines.push(row.trim_end().to_string());
        if y + 1 < graph.height() {
            lines.push(links.trim_end().to_string());
        }
    }

    // Drop blank rows above and below the dungeon
    let first = lines.iter().position(|l| !l.is_empty()).unwrap_or(0);
    let last = lines.iter().rposition(|l| !l.is_empty()).map_or(0, |i| i + 1);
    lines.get(first..last).unwrap_or_default().join("\n")
}

/// Legend for [`render_minimap`].
pub fn minimap_legend() -> &'static str {
    "@ you  S start  $ shop  T treasure  B boss  . explored  x cleared"
}

/// Renders a room canvas: `#` wall, `.` floor, obstacles and any live
/// enemies or boss on top.
pub fn render_room(room: &Room) -> String {
    let mut grid: Vec<Vec<char>> = (0..room.canvas_height)
        .map(|y| {
            (0..room.canvas_width)
                .map(|x| match room.tile(x, y) {
                    Some(TileKind::Floor) => '.',
                    _ => '#',
                })
                .collect()
        })
        .collect();

    let mut put = |x: i32, y: i32, glyph: char| {
        if let Some(cell) = grid
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            *cell = glyph;
        }
    };

    for obstacle in &room.obstacles {
        put(obstacle.x, obstacle.y, obstacle.kind.glyph());
    }
    for enemy in &room.enemies {
        put(enemy.x, enemy.y, enemy.kind.glyph());
    }
    if room.boss_active {
        if let Some(boss) = room.boss() {
            let (cx, cy) = room.bounds.center();
            put(cx, cy, boss.blueprint().glyph);
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line description of the current room.
pub fn describe_room(dungeon: &Dungeon) -> String {
    let pos = dungeon.current_pos();
    let Some(room) = dungeon.current_room() else {
        return format!("{pos}: nothing here");
    };

    let depth = dungeon.room_depth(None).unwrap_or(0);
    let exits: Vec<&str> = room.doors.active().map(|d| d.name()).collect();
    let mut text = format!(
        "{pos} depth {depth}, {} room, exits: {}",
        room.role.name(),
        exits.join(", ")
    );

    if let Some(boss) = room.boss().filter(|_| room.boss_active) {
        text.push_str(&format!(". {} blocks the way", boss.blueprint().name));
    } else if !room.enemies.is_empty() {
        text.push_str(&format!(". {} enemies", room.enemies.len()));
    }
    if room.locked {
        text.push_str(". The doors are sealed");
    }
    if !room.shop_stock.is_empty() {
        text.push_str(&format!(". For sale: {}", room.shop_stock.join(", ")));
    }
    if room.loot_table().is_some() && !room.container_opened {
        text.push_str(". A chest waits here");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, GenerationConfig};

    fn dungeon(seed: u64) -> Dungeon {
        Dungeon::new(GenerationConfig::for_testing(seed)).unwrap()
    }

    #[test]
    fn test_minimap_marks_every_room() {
        let dungeon = dungeon(42);
        let map = render_minimap(&dungeon);
        let cells = map.matches('[').count();
        assert_eq!(cells, dungeon.room_count());
        assert_eq!(map.matches("[@]").count(), 1);
        assert_eq!(map.matches("[B]").count(), 1);
    }

    #[test]
    fn test_minimap_shows_start_after_moving() {
        let mut dungeon = dungeon(42);
        let direction = Direction::ALL
            .into_iter()
            .find(|&d| dungeon.can_move(d))
            .unwrap();
        dungeon.try_move(direction);
        let map = render_minimap(&dungeon);
        assert!(map.contains("[S]"));
        assert!(map.contains("[@]"));
    }

    #[test]
    fn test_minimap_connectors_follow_doors() {
        let dungeon = dungeon(8);
        let map = render_minimap(&dungeon);
        let horizontal = dungeon
            .rooms()
            .filter(|(_, room)| room.doors.east)
            .count();
        let vertical = dungeon
            .rooms()
            .filter(|(_, room)| room.doors.south)
            .count();
        assert_eq!(map.matches("]-[").count(), horizontal);
        assert_eq!(map.matches('|').count(), vertical);
    }

    #[test]
    fn test_render_room_dimensions() {
        let dungeon = dungeon(3);
        let room = dungeon.current_room().unwrap();
        let text = render_room(room);
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), room.canvas_height as usize);
        assert!(rows.iter().all(|r| r.len() == room.canvas_width as usize));
        assert!(text.contains('.'));
        assert!(text.contains('#'));
    }

    #[test]
    fn test_describe_room_lists_exits() {
        let dungeon = dungeon(3);
        let text = describe_room(&dungeon);
        assert!(text.contains("depth 0"));
        for direction in dungeon.current_room().unwrap().doors.active() {
            assert!(text.contains(direction.name()));
        }
    }
}
