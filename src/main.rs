fn main() {
    occupancy_mapper::run_cli();
}
