//! Character states. Each exposes the hooks it needs out of enter / update / fixed_update /
//! exit; `fsm::CharacterState` dispatches to them.

pub mod bot_idle_attack;
pub mod bot_move;
pub mod casting;
pub mod human_move;
pub mod idle_attack;
