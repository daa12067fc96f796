/*
 * Hardware Drivers
 *
 * Driver categories:
 * - gpio: exclusive two-pin GPIO character device
 */

pub mod gpio;
