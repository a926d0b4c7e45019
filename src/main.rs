fn main() {
    petrel_core::uci::run();
}
