fn main() {
    duel_combat::game::run();
}
