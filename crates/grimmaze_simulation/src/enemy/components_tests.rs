//! Tests for enemy FSM components.

#[cfg(test)]
mod tests {
    use crate::enemy::components::{Enemy, EnemyConfig, EnemyState, Velocity};
    use crate::map::TileId;
    use bevy::math::Vec3;

    #[test]
    fn test_enemy_state_default() {
        let state = EnemyState::default();
        assert!(matches!(state, EnemyState::Default));
    }

    #[test]
    fn test_enemy_config_default() {
        let config = EnemyConfig::default();
        assert_eq!(config.speed, 1.0);
        assert_eq!(config.vision_range, 5.0);
        assert_eq!(config.max_proximity_counter, 5);
    }

    #[test]
    fn test_enemy_at_starts_clean() {
        let enemy = Enemy::at(TileId(4));
        assert_eq!(enemy.current_tile, TileId(4));
        assert!(enemy.target_tile.is_none());
        assert!(enemy.path.is_empty());
    }

    #[test]
    fn test_velocity_default_zero() {
        let velocity = Velocity::default();
        assert_eq!(velocity.0, Vec3::ZERO);
    }
}
