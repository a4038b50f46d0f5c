fn main() {
    std::process::exit(groupdisk_lib::run());
}
