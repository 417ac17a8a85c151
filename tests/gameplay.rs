//! End-to-end gameplay scenarios driven through the public world API.

use delved::config::{MAP_HEIGHT, MAP_WIDTH, PLAYER_START_HP};
use delved::game::PlayerId;
use delved::{DungeonLevel, Entity, EntityKind, GameWorld, Position, Tile};
use uuid::Uuid;

/// A world whose first depth is one large open room.
fn open_world() -> GameWorld {
    let mut world = GameWorld::new(99);
    world.insert_level(open_level(1));
    world
}

fn open_level(depth: u32) -> DungeonLevel {
    let mut level = DungeonLevel::blank(depth);
    for y in 1..MAP_HEIGHT - 1 {
        for x in 1..MAP_WIDTH - 1 {
            level.set_tile(Position::new(x, y), Tile::floor());
        }
    }
    level
}

fn join_at(world: &mut GameWorld, name: &str, pos: Position) -> PlayerId {
    let id = Uuid::new_v4();
    world.add_player(id, name.to_string(), false);
    world.players.get_mut(&id).unwrap().pos = pos;
    world.update_player_fov(id);
    id
}

fn enemy(name: &str, pos: Position, hp: i32) -> Entity {
    Entity {
        id: Uuid::new_v4(),
        kind: EntityKind::Enemy,
        pos,
        glyph: name.chars().next().unwrap().to_ascii_lowercase(),
        color: "text-enemy".to_string(),
        name: name.to_string(),
        hp: Some(hp),
        max_hp: Some(hp),
    }
}

fn item(name: &str, glyph: char, pos: Position) -> Entity {
    Entity {
        id: Uuid::new_v4(),
        kind: EntityKind::Item,
        pos,
        glyph,
        color: "text-item".to_string(),
        name: name.to_string(),
        hp: None,
        max_hp: None,
    }
}

#[test]
fn test_fighting_a_goblin_to_the_death() {
    let mut world = open_world();
    let id = join_at(&mut world, "Hero", Position::new(20, 20));
    {
        let player = world.players.get_mut(&id).unwrap();
        player.max_hp = 100;
        player.hp = 100;
    }
    world
        .levels
        .get_mut(&1)
        .unwrap()
        .entities
        .push(enemy("Goblin", Position::new(21, 20), 8));

    // Minimum damage is 1 per exchange, so 8 bumps always finish it.
    for _ in 0..8 {
        if world.levels[&1].entity_at(Position::new(21, 20)).is_none() {
            break;
        }
        assert!(world.move_player(id, 1, 0));
    }

    let player = &world.players[&id];
    assert!(world.levels[&1].entity_at(Position::new(21, 20)).is_none());
    assert_eq!(player.stats.kills, 1);
    assert_eq!(player.max_hp, 102);
    assert!(player.hp <= player.max_hp);
    assert_eq!(player.pos, Position::new(20, 20));
    assert!(player.stats.damage_dealt >= 8);
    assert!(world
        .messages(id)
        .iter()
        .any(|m| m == "You killed the Goblin. [+2 Max HP]"));
}

#[test]
fn test_combat_damage_ranges_scale_with_depth() {
    for depth in [1u32, 5, 10] {
        let mut world = open_world();
        world.insert_level(open_level(depth));
        let id = join_at(&mut world, "Hero", Position::new(20, 20));
        world.depths.insert(id, depth);
        {
            let player = world.players.get_mut(&id).unwrap();
            player.max_hp = 1000;
            player.hp = 1000;
            player.pos = Position::new(20, 20);
        }
        world
            .levels
            .get_mut(&depth)
            .unwrap()
            .entities
            .push(enemy("Troll", Position::new(21, 20), 100_000));

        assert!(world.move_player(id, 1, 0));

        let stats = &world.players[&id].stats;
        let bonus = depth as u32 / 2;
        assert!(stats.damage_dealt >= 1 + bonus && stats.damage_dealt <= 5 + bonus);
        let retaliation_bonus = depth as u32 * 3 / 10;
        assert!(
            stats.damage_taken >= 1 + retaliation_bonus
                && stats.damage_taken <= 3 + retaliation_bonus
        );
    }
}

#[test]
fn test_death_and_respawn() {
    let mut world = open_world();
    let id = join_at(&mut world, "Hero", Position::new(20, 20));
    {
        let player = world.players.get_mut(&id).unwrap();
        player.hp = 1;
    }
    world
        .levels
        .get_mut(&1)
        .unwrap()
        .entities
        .push(enemy("Dragon", Position::new(21, 20), 100_000));

    // The survivor always retaliates for at least 1.
    assert!(world.move_player(id, 1, 0));

    let player = &world.players[&id];
    assert!(player.dead);
    assert_eq!(player.hp, 0);
    assert_eq!(player.stats.killed_by, "Dragon");
    assert!(world
        .messages(id)
        .iter()
        .any(|m| m == "You have been slain by the Dragon..."));

    world.respawn_player(id);
    let player = &world.players[&id];
    assert!(!player.dead);
    assert_eq!(player.hp, PLAYER_START_HP);
    assert!(player.stats.killed_by.is_empty());
    assert_eq!(world.depth_of(id), Some(1));
    assert!(player
        .explored
        .iter()
        .all(|row| row.iter().all(|&seen| !seen)));
    assert!(world
        .messages(id)
        .iter()
        .any(|m| m == "You awaken at the dungeon entrance..."));
}

#[test]
fn test_health_potion_heals_up_to_five() {
    let mut world = open_world();
    let id = join_at(&mut world, "Hero", Position::new(20, 20));
    world.players.get_mut(&id).unwrap().hp = 10;
    world
        .levels
        .get_mut(&1)
        .unwrap()
        .entities
        .push(item("Health Potion", '!', Position::new(21, 20)));

    assert!(world.move_player(id, 1, 0));

    let player = &world.players[&id];
    assert_eq!(player.hp, 15);
    assert_eq!(player.pos, Position::new(21, 20));
    assert_eq!(player.stats.items_collected, 1);
    assert_eq!(player.stats.steps_walked, 1);
    assert!(world.messages(id).iter().any(|m| m == "Restored 5 HP."));
    assert!(world
        .messages(id)
        .iter()
        .any(|m| m == "You picked up a Health Potion."));
}

#[test]
fn test_full_potion_grants_no_overheal_message() {
    let mut world = open_world();
    let id = join_at(&mut world, "Hero", Position::new(20, 20));
    world
        .levels
        .get_mut(&1)
        .unwrap()
        .entities
        .push(item("Health Potion", '!', Position::new(21, 20)));

    assert!(world.move_player(id, 1, 0));

    let player = &world.players[&id];
    assert_eq!(player.hp, player.max_hp);
    assert!(!world.messages(id).iter().any(|m| m.starts_with("Restored")));
}

#[test]
fn test_descending_the_stairs() {
    let mut world = open_world();
    let id = join_at(&mut world, "Hero", Position::new(20, 20));
    let stairs = Position::new(21, 20);
    {
        let level = world.levels.get_mut(&1).unwrap();
        level.set_tile(stairs, Tile::stairs_down());
        level.entities.push(Entity {
            id: Uuid::new_v4(),
            kind: EntityKind::StairsDown,
            pos: stairs,
            glyph: '>',
            color: "text-primary".to_string(),
            name: "Stairs Down".to_string(),
            hp: None,
            max_hp: None,
        });
    }

    assert!(world.move_player(id, 1, 0));

    assert_eq!(world.depth_of(id), Some(2));
    assert!(world.levels.contains_key(&2));
    let player = &world.players[&id];
    assert_eq!(player.stats.deepest_depth, 2);
    // Descending consumes the move without counting a step.
    assert_eq!(player.stats.steps_walked, 0);
    // Exploration memory is blank until the first step on the new depth.
    assert!(player
        .explored
        .iter()
        .all(|row| row.iter().all(|&seen| !seen)));
    assert!(world
        .messages(id)
        .iter()
        .any(|m| m == "You descend to depth 2..."));
}

#[test]
fn test_descent_announced_on_both_depths() {
    let mut world = open_world();
    world.insert_level(open_level(2));
    let a = join_at(&mut world, "Alice", Position::new(20, 20));
    let b = join_at(&mut world, "Bob", Position::new(30, 30));
    let c = join_at(&mut world, "Cara", Position::new(40, 20));
    world.depths.insert(b, 2);
    let stairs = Position::new(21, 20);
    {
        let level = world.levels.get_mut(&1).unwrap();
        level.set_tile(stairs, Tile::stairs_down());
        level.entities.push(Entity {
            id: Uuid::new_v4(),
            kind: EntityKind::StairsDown,
            pos: stairs,
            glyph: '>',
            color: "text-primary".to_string(),
            name: "Stairs Down".to_string(),
            hp: None,
            max_hp: None,
        });
    }

    assert!(world.move_player(a, 1, 0));

    // The depth left behind hears the departure, the destination the arrival.
    assert!(world
        .messages(c)
        .iter()
        .any(|m| m == "Alice descended deeper."));
    assert!(world
        .messages(b)
        .iter()
        .any(|m| m == "Alice arrived from above."));
    assert!(!world
        .messages(c)
        .iter()
        .any(|m| m == "Alice arrived from above."));
}

#[test]
fn test_exploration_only_grows_while_walking() {
    let mut world = open_world();
    let id = join_at(&mut world, "Hero", Position::new(20, 20));

    let count = |world: &GameWorld| {
        world.players[&id]
            .explored
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&seen| seen)
            .count()
    };

    let mut previous = count(&world);
    assert!(previous > 0);
    for step in [(1, 0), (1, 0), (0, 1), (-1, 0), (0, -1)] {
        assert!(world.move_player(id, step.0, step.1));
        let now = count(&world);
        assert!(now >= previous);
        previous = now;
    }
}
