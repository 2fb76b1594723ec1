/// Events emitted during a simulation step.
/// The presentation layer and the log consume these.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    FoodEaten { x: i32, y: i32 },
    LengthChanged { length: usize },
    SnakeCrashed { x: i32, y: i32 },
    BoardFilled,
}
